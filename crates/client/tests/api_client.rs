use client::{ApiClient, ClientError, JudgingApi, Session};
use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use judging::RoundKey;
use judging::dto::judging::SubmitScoreRequest;
use rust_decimal::Decimal;
use serde_json::json;

fn client(server: &MockServer, token: Option<&str>) -> ApiClient {
    let session = Session::with_token(token.map(str::to_string));
    ApiClient::new(server.url("/api"), session).unwrap()
}

#[tokio::test]
async fn test_judge_rounds_sends_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/judge/rounds")
                .header("authorization", "Bearer judge-token");
            then.status(200).json_body(json!({
                "rounds": [{
                    "eventId": 3,
                    "roundNo": 1,
                    "isCompleted": false,
                    "Event": {"id": 3, "name": "Hackathon", "eventType": "TEAM"},
                    "Criteria": [{"id": 9, "name": "Innovation", "scoreOutOf": 25}]
                }]
            }));
        })
        .await;

    let rounds = client(&server, Some("judge-token"))
        .judge_rounds()
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0].key(), RoundKey::new(3, 1));
    assert_eq!(rounds[0].criteria[0].max_score(), 25);
}

#[tokio::test]
async fn test_missing_token_fails_without_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.path("/api/judge/rounds");
            then.status(200).json_body(json!({"rounds": []}));
        })
        .await;

    let err = client(&server, None).judge_rounds().await.unwrap_err();

    assert!(err.is_authorization());
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_status_codes_map_to_error_kinds() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/judge/rounds");
            then.status(401).json_body(json!({"message": "Session expired"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/judge/events/4/rounds/2/teams");
            then.status(404).json_body(json!({"message": "Round not found"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/judge/events/4/rounds/2/score-sheet");
            then.status(500).json_body(json!({"message": "Database unavailable"}));
        })
        .await;

    let api = client(&server, Some("t"));
    let key = RoundKey::new(4, 2);

    let err = api.judge_rounds().await.unwrap_err();
    assert!(matches!(err, ClientError::Authorization(ref m) if m == "Session expired"));

    let err = api.teams_by_round(key).await.unwrap_err();
    assert!(err.is_not_found());

    match api.score_sheet(key).await.unwrap_err() {
        ClientError::Server { status, message } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "Database unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_score_posts_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/judge/events/4/rounds/2/score")
                .json_body(json!({"teamId": 7, "criteriaId": 100, "score": "7.5"}));
            then.status(200).json_body(json!({"message": "Score updated"}));
        })
        .await;

    let request = SubmitScoreRequest {
        team_id: 7,
        criteria_id: 100,
        score: Decimal::new(75, 1),
    };
    client(&server, Some("t"))
        .submit_score(RoundKey::new(4, 2), &request)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_score_sheet_parses_nested_scores() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/judge/events/4/rounds/2/score-sheet");
            then.status(200).json_body(json!({
                "teams": [{
                    "id": 7,
                    "name": "Alpha",
                    "teamId": "INC-7",
                    "Score": [{
                        "score": "8.5",
                        "Judge": {"id": 10, "name": "Rao"},
                        "Criteria": {"id": 100, "name": "Idea", "scoreOutOf": 10}
                    }]
                }]
            }));
        })
        .await;

    let sheet = client(&server, Some("t"))
        .score_sheet(RoundKey::new(4, 2))
        .await
        .unwrap();

    let score = &sheet.teams[0].scores[0];
    assert_eq!(score.judge.name, "Rao");
    assert_eq!(score.score, Decimal::new(85, 1));
}

#[tokio::test]
async fn test_published_events_do_not_need_a_token() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/events/published");
            then.status(200).json_body(json!({
                "events": [{
                    "id": 1,
                    "name": "Hackathon",
                    "category": "TECHNICAL",
                    "eventType": "TEAM",
                    "isStarted": true,
                    "rounds": [{"roundNo": 1, "date": "2025-02-27T06:30:00Z", "isCompleted": false}]
                }],
                "days": {"day1": "2025-02-27T00:00:00Z"}
            }));
        })
        .await;

    let published = client(&server, None).published_events().await.unwrap();

    assert_eq!(published.events[0].name, "Hackathon");
    assert!(published.days.day1.is_some());
    assert!(published.days.day2.is_none());
}

#[tokio::test]
async fn test_change_password_mismatch_is_local() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.path("/api/auth/change-password");
            then.status(200).json_body(json!({"message": "Password changed"}));
        })
        .await;

    let request = judging::dto::auth::ChangePasswordRequest {
        current_password: "old".to_string(),
        new_password: "new-secret".to_string(),
        confirm_new_password: "different".to_string(),
    };
    let err = client(&server, Some("t"))
        .change_password(&request)
        .await
        .unwrap_err();

    assert!(err.is_local());
    assert_eq!(mock.hits_async().await, 0);
}
