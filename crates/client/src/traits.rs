use judging::dto::events::PublishedEventsResponse;
use judging::dto::judging::{ScoreSheetResponse, SubmitScoreRequest};
use judging::dto::winners::{EventWinner, WinnerRecord};
use judging::{JudgeRound, PublicEvent, RoundKey, Team};

use crate::Result;

/// The remote operations the dashboards depend on.
#[async_trait::async_trait]
pub trait JudgingApi: Send + Sync {
    /// Rounds assigned to the authenticated judge, in server order.
    async fn judge_rounds(&self) -> Result<Vec<JudgeRound>>;

    async fn teams_by_round(&self, round: RoundKey) -> Result<Vec<Team>>;

    async fn submit_score(&self, round: RoundKey, request: &SubmitScoreRequest) -> Result<()>;

    async fn score_sheet(&self, round: RoundKey) -> Result<ScoreSheetResponse>;

    async fn event_winners(&self, event_id: i32) -> Result<Vec<EventWinner>>;

    async fn all_winners(&self) -> Result<Vec<WinnerRecord>>;

    async fn published_events(&self) -> Result<PublishedEventsResponse>;

    async fn published_event(&self, event_id: i32) -> Result<PublicEvent>;
}
