use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use judging::dto::judging::{ScoreSheetResponse, SubmitScoreRequest};
use judging::services::rounds::{find_round, is_final_round, sorted_rounds};
use judging::services::scoring::validate_score;
use judging::{Criteria, JudgeRound, RoundKey, Team};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::drafts::{CommitOutcome, FieldKey, ScoreDrafts};
use super::selection::Selection;
use crate::cache::{QueryCache, QueryKey};
use crate::notice::Notice;
use crate::traits::JudgingApi;
use crate::{ClientError, Result};

/// Result of listing the judge's rounds.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundListing {
    Assigned(Arc<Vec<JudgeRound>>),
    /// No rounds, or the session is not allowed to judge.
    NotAssigned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub outcome: CommitOutcome,
    pub notice: Option<Notice>,
}

/// The judge's working surface: assigned rounds, team lists, score entry and
/// the current selection.
pub struct JudgingDashboard {
    api: Arc<dyn JudgingApi>,
    cache: QueryCache,
    selection: Selection,
    drafts: Mutex<ScoreDrafts>,
}

impl JudgingDashboard {
    pub fn new(api: Arc<dyn JudgingApi>, cache: QueryCache) -> Self {
        Self {
            api,
            cache,
            selection: Selection::default(),
            drafts: Mutex::new(ScoreDrafts::default()),
        }
    }

    fn drafts(&self) -> MutexGuard<'_, ScoreDrafts> {
        self.drafts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch_rounds(&self) -> Result<Arc<Vec<JudgeRound>>> {
        let api = Arc::clone(&self.api);
        self.cache
            .fetch(QueryKey::JudgeRounds, move || async move {
                api.judge_rounds().await.map(sorted_rounds)
            })
            .await
    }

    /// Rounds assigned to the judge, sorted by event name then round number.
    pub async fn list_rounds(&self) -> Result<RoundListing> {
        match self.fetch_rounds().await {
            Ok(rounds) if rounds.is_empty() => Ok(RoundListing::NotAssigned),
            Ok(rounds) => Ok(RoundListing::Assigned(rounds)),
            Err(e) if e.is_authorization() => {
                warn!("Round listing refused: {}", e);
                Ok(RoundListing::NotAssigned)
            }
            Err(e) => Err(e),
        }
    }

    /// Force the next listing to go to the server.
    pub fn refresh_rounds(&self) {
        self.cache.invalidate(&QueryKey::JudgeRounds);
    }

    /// Latest fetched round list, if any.
    pub fn rounds(&self) -> Option<Arc<Vec<JudgeRound>>> {
        self.cache.peek(&QueryKey::JudgeRounds)
    }

    /// Derived from the latest round list each time it is asked.
    pub fn is_final_round(&self, key: RoundKey) -> bool {
        self.rounds()
            .is_some_and(|rounds| is_final_round(&rounds, key))
    }

    async fn round(&self, key: RoundKey) -> Result<JudgeRound> {
        let rounds = self.fetch_rounds().await?;
        find_round(&rounds, key)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("Round".to_string()))
    }

    async fn criteria(&self, key: RoundKey, criteria_id: i32) -> Result<Criteria> {
        self.round(key)
            .await?
            .find_criteria(criteria_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("Criteria".to_string()))
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub async fn select_round(&mut self, key: RoundKey) -> Result<JudgeRound> {
        let round = self.round(key).await?;
        self.selection.select_round(key);
        info!("Selected {} ({})", key, round.event_name());
        Ok(round)
    }

    pub fn select_team(&mut self, team_id: i32) -> Result<()> {
        self.selection.select_team(team_id)
    }

    pub fn toggle_selection_mode(&mut self) -> Result<bool> {
        self.selection.toggle_selection_mode()
    }

    /// Teams of a round with their scores. Drafts are re-seeded from the result.
    pub async fn list_teams_for_round(&self, key: RoundKey) -> Result<Arc<Vec<Team>>> {
        let api = Arc::clone(&self.api);
        let teams = self
            .cache
            .fetch(QueryKey::JudgeTeams(key), move || async move {
                api.teams_by_round(key).await
            })
            .await?;
        self.drafts().seed(key, &teams);
        Ok(teams)
    }

    /// Validate and persist one score. Out-of-range values never reach the server.
    pub async fn submit_score(
        &self,
        key: RoundKey,
        team_id: i32,
        criteria_id: i32,
        value: Decimal,
    ) -> Result<()> {
        let criteria = self.criteria(key, criteria_id).await?;
        let score = validate_score(value, &criteria)?;

        let request = SubmitScoreRequest {
            team_id,
            criteria_id,
            score,
        };
        self.api.submit_score(key, &request).await?;
        self.cache.invalidate(&QueryKey::JudgeTeams(key));

        info!(
            "Saved score {} for team {} on '{}' ({})",
            score, team_id, criteria.name, key
        );
        Ok(())
    }

    pub async fn score_sheet(&self, key: RoundKey) -> Result<Arc<ScoreSheetResponse>> {
        let api = Arc::clone(&self.api);
        self.cache
            .fetch(QueryKey::ScoreSheet(key), move || async move {
                api.score_sheet(key).await
            })
            .await
    }

    pub fn draft(&self, field: &FieldKey) -> String {
        self.drafts().draft(field).to_string()
    }

    /// Returns false when the input was refused and the draft kept.
    pub async fn edit_score(&self, field: FieldKey, input: &str) -> Result<bool> {
        let criteria = self.criteria(field.round, field.criteria_id).await?;
        Ok(self.drafts().edit(field, input, &criteria))
    }

    /// Submit the field's draft if it changed. Failures roll the draft back
    /// and are reported through the notice instead of an error.
    pub async fn commit_score(&self, field: FieldKey) -> Result<CommitReport> {
        let criteria = self.criteria(field.round, field.criteria_id).await?;

        let pending = match self.drafts().begin_commit(field, &criteria) {
            Ok(Some(pending)) => pending,
            Ok(None) => {
                return Ok(CommitReport {
                    outcome: CommitOutcome::Unchanged,
                    notice: None,
                });
            }
            Err(e) => {
                return Ok(CommitReport {
                    outcome: CommitOutcome::RolledBack,
                    notice: Some(e.notice()),
                });
            }
        };

        let request = SubmitScoreRequest {
            team_id: field.team_id,
            criteria_id: field.criteria_id,
            score: pending.value,
        };
        let result = self.api.submit_score(field.round, &request).await;
        let outcome = self.drafts().complete(pending, result.is_ok());

        let notice = match result {
            Ok(()) => {
                self.cache.invalidate(&QueryKey::JudgeTeams(field.round));
                (outcome == CommitOutcome::Saved).then(|| Notice::success("Score saved"))
            }
            Err(e) => {
                warn!(
                    "Score for team {} on '{}' was rejected: {}",
                    field.team_id, criteria.name, e
                );
                (outcome == CommitOutcome::RolledBack).then(|| e.notice())
            }
        };

        Ok(CommitReport { outcome, notice })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::SelectionState;
    use crate::dashboard::testing::{MockApi, judge_round, team};
    use std::sync::atomic::Ordering;

    fn setup() -> (JudgingDashboard, Arc<MockApi>) {
        let api = Arc::new(MockApi::default());
        *api.rounds.lock().unwrap() = vec![
            judge_round(2, "eventB", 1),
            judge_round(1, "eventA", 2),
            judge_round(1, "eventA", 1),
        ];
        *api.teams.lock().unwrap() = vec![team(
            7,
            "Alpha",
            serde_json::json!([{"criteriaId": 100, "score": "12"}]),
        )];
        let dashboard = JudgingDashboard::new(api.clone(), QueryCache::default());
        (dashboard, api)
    }

    #[tokio::test]
    async fn test_list_rounds_sorted() {
        let (dashboard, _) = setup();
        let RoundListing::Assigned(rounds) = dashboard.list_rounds().await.unwrap() else {
            panic!("expected rounds");
        };
        let keys: Vec<_> = rounds.iter().map(|r| (r.event_id, r.round_no)).collect();
        assert_eq!(keys, vec![(1, 1), (1, 2), (2, 1)]);
    }

    #[tokio::test]
    async fn test_authorization_error_is_not_assigned() {
        let (dashboard, api) = setup();
        api.unauthorized.store(true, Ordering::SeqCst);
        assert_eq!(
            dashboard.list_rounds().await.unwrap(),
            RoundListing::NotAssigned
        );

        let (dashboard, api) = setup();
        api.rounds.lock().unwrap().clear();
        assert_eq!(
            dashboard.list_rounds().await.unwrap(),
            RoundListing::NotAssigned
        );
    }

    #[tokio::test]
    async fn test_final_round_follows_latest_list() {
        let (dashboard, api) = setup();
        dashboard.list_rounds().await.unwrap();
        assert!(dashboard.is_final_round(RoundKey::new(1, 2)));
        assert!(!dashboard.is_final_round(RoundKey::new(1, 1)));

        api.rounds.lock().unwrap().push(judge_round(1, "eventA", 3));
        dashboard.refresh_rounds();
        dashboard.list_rounds().await.unwrap();
        assert!(!dashboard.is_final_round(RoundKey::new(1, 2)));
        assert!(dashboard.is_final_round(RoundKey::new(1, 3)));
    }

    #[tokio::test]
    async fn test_out_of_range_score_never_sent() {
        let (dashboard, api) = setup();
        let key = RoundKey::new(1, 1);

        let err = dashboard
            .submit_score(key, 7, 101, Decimal::from(11))
            .await
            .unwrap_err();
        assert!(err.is_local());
        let err = dashboard
            .submit_score(key, 7, 100, Decimal::from(-1))
            .await
            .unwrap_err();
        assert!(err.is_local());
        assert_eq!(api.calls("submit_score"), 0);

        dashboard
            .submit_score(key, 7, 100, Decimal::from(20))
            .await
            .unwrap();
        assert_eq!(api.calls("submit_score"), 1);
    }

    #[tokio::test]
    async fn test_submit_invalidates_team_list() {
        let (dashboard, api) = setup();
        let key = RoundKey::new(1, 1);

        dashboard.list_teams_for_round(key).await.unwrap();
        dashboard.list_teams_for_round(key).await.unwrap();
        assert_eq!(api.calls("teams_by_round"), 1);

        dashboard
            .submit_score(key, 7, 100, Decimal::from(15))
            .await
            .unwrap();
        dashboard.list_teams_for_round(key).await.unwrap();
        assert_eq!(api.calls("teams_by_round"), 2);
    }

    #[tokio::test]
    async fn test_unknown_round_is_not_found() {
        let (dashboard, _) = setup();
        let err = dashboard
            .list_teams_for_round(RoundKey::new(9, 1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_selecting_round_resets_team_and_mode() {
        let (mut dashboard, _) = setup();
        assert!(dashboard.select_team(7).is_err());

        dashboard.select_round(RoundKey::new(1, 1)).await.unwrap();
        dashboard.select_team(7).unwrap();
        assert!(dashboard.toggle_selection_mode().unwrap());

        dashboard.select_round(RoundKey::new(1, 2)).await.unwrap();
        assert_eq!(
            dashboard.selection().state(),
            SelectionState::RoundSelected(RoundKey::new(1, 2))
        );
        assert!(!dashboard.selection().selection_mode());

        assert!(dashboard.select_round(RoundKey::new(3, 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_commit_saves_changed_draft() {
        let (dashboard, api) = setup();
        let key = RoundKey::new(1, 1);
        let field = FieldKey::new(key, 7, 100);

        dashboard.list_teams_for_round(key).await.unwrap();
        assert_eq!(dashboard.draft(&field), "12");

        let report = dashboard.commit_score(field).await.unwrap();
        assert_eq!(report.outcome, CommitOutcome::Unchanged);
        assert_eq!(api.calls("submit_score"), 0);

        assert!(!dashboard.edit_score(field, "25").await.unwrap());
        assert!(dashboard.edit_score(field, "14.5").await.unwrap());
        let report = dashboard.commit_score(field).await.unwrap();
        assert_eq!(report.outcome, CommitOutcome::Saved);
        assert_eq!(report.notice, Some(Notice::success("Score saved")));
        assert_eq!(
            api.submitted.lock().unwrap()[0].score,
            Decimal::new(145, 1)
        );
    }

    #[tokio::test]
    async fn test_rejected_commit_rolls_back() {
        let (dashboard, api) = setup();
        let key = RoundKey::new(1, 1);
        let field = FieldKey::new(key, 7, 100);
        dashboard.list_teams_for_round(key).await.unwrap();
        api.reject_scores.store(true, Ordering::SeqCst);

        dashboard.edit_score(field, "18").await.unwrap();
        let report = dashboard.commit_score(field).await.unwrap();
        assert_eq!(report.outcome, CommitOutcome::RolledBack);
        assert_eq!(report.notice, Some(Notice::error("Round is locked")));
        assert_eq!(dashboard.draft(&field), "12");
    }
}
