use std::time::Duration;

use judging::dto::auth::{ChangePasswordRequest, MeResponse, MessageResponse};
use judging::dto::events::{PublishedEventResponse, PublishedEventsResponse};
use judging::dto::judging::{RoundsResponse, ScoreSheetResponse, SubmitScoreRequest, TeamsResponse};
use judging::dto::winners::{AllWinnersResponse, EventWinner, EventWinnersResponse, WinnerRecord};
use judging::{JudgeRound, PublicEvent, RoundKey, Team, User};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use validator::Validate;

use crate::error::{ClientError, Result};
use crate::session::Session;
use crate::traits::JudgingApi;

/// Origin used when no API URL is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:4000/api";

const DEFAULT_SOCKET_ORIGIN: &str = "http://localhost:4000";

/// Push channel origin for an API base URL: the same origin with a trailing
/// `/api` segment removed.
pub fn socket_origin(api_url: &str) -> String {
    let trimmed = api_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_SOCKET_ORIGIN.to_string();
    }
    trimmed.strip_suffix("/api").unwrap_or(trimmed).to_string()
}

/// HTTP client for the fest API.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Session) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.session.require_token()?;
        Ok(builder.bearer_auth(token))
    }

    fn optional_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.authorized(self.client.get(&url))?.send().await?;
        read_json(response, what).await
    }

    async fn get_public_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.optional_auth(self.client.get(&url)).send().await?;
        read_json(response, what).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        what: &str,
    ) -> Result<Response> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .authorized(self.client.post(&url))?
            .json(body)
            .send()
            .await?;
        check_status(response, what).await
    }

    /// Profile of the authenticated user.
    pub async fn me(&self) -> Result<User> {
        let response: MeResponse = self.get_json("/auth/me", "User").await?;
        Ok(response.user)
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<String> {
        request
            .validate()
            .map_err(|e| ClientError::Validation(e.to_string()))?;

        let response = self
            .post_json("/auth/change-password", request, "User")
            .await?;
        let body: MessageResponse = response.json().await?;
        Ok(body.message)
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    warn!("{} request failed with {}: {}", what, status, message);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Authorization(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(what.to_string()),
        _ => ClientError::Server { status, message },
    })
}

async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let response = check_status(response, what).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Extract `message` (or `error`) from a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[async_trait::async_trait]
impl JudgingApi for ApiClient {
    async fn judge_rounds(&self) -> Result<Vec<JudgeRound>> {
        let response: RoundsResponse = self.get_json("/judge/rounds", "Rounds").await?;
        Ok(response.rounds)
    }

    async fn teams_by_round(&self, round: RoundKey) -> Result<Vec<Team>> {
        let path = format!(
            "/judge/events/{}/rounds/{}/teams",
            round.event_id, round.round_no
        );
        let response: TeamsResponse = self.get_json(&path, "Round").await?;
        Ok(response.teams)
    }

    async fn submit_score(&self, round: RoundKey, request: &SubmitScoreRequest) -> Result<()> {
        let path = format!(
            "/judge/events/{}/rounds/{}/score",
            round.event_id, round.round_no
        );
        self.post_json(&path, request, "Round").await?;
        Ok(())
    }

    async fn score_sheet(&self, round: RoundKey) -> Result<ScoreSheetResponse> {
        let path = format!(
            "/judge/events/{}/rounds/{}/score-sheet",
            round.event_id, round.round_no
        );
        self.get_json(&path, "Score sheet").await
    }

    async fn event_winners(&self, event_id: i32) -> Result<Vec<EventWinner>> {
        let path = format!("/judge/events/{}/winners", event_id);
        let response: EventWinnersResponse = self.get_json(&path, "Event").await?;
        Ok(response.winners)
    }

    async fn all_winners(&self) -> Result<Vec<WinnerRecord>> {
        let response: AllWinnersResponse = self.get_json("/judge/winners", "Winners").await?;
        Ok(response.winners)
    }

    async fn published_events(&self) -> Result<PublishedEventsResponse> {
        self.get_public_json("/events/published", "Events").await
    }

    async fn published_event(&self, event_id: i32) -> Result<PublicEvent> {
        let path = format!("/events/published/{}", event_id);
        let response: PublishedEventResponse = self.get_public_json(&path, "Event").await?;
        Ok(response.event)
    }
}
