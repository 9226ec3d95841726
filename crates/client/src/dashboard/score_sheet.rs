use std::sync::Arc;
use std::time::Duration;

use judging::dto::judging::{ScoreSheetResponse, ScoreSheetTeam};
use judging::services::export::{score_sheet_csv, score_sheet_file_name};
use judging::services::score_sheet::{JudgeTally, judge_criteria, judge_tally, judges};
use judging::{Criteria, Judge, RoundKey};
use tracing::{debug, info, warn};

use crate::cache::{QueryCache, QueryKey};
use crate::realtime::{Subscription, SubscriptionManager};
use crate::traits::JudgingApi;
use crate::{ClientError, Result};

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// A mounted score sheet for one round, kept current by push updates.
///
/// Dropping the view releases its subscription.
pub struct ScoreSheetView {
    key: RoundKey,
    api: Arc<dyn JudgingApi>,
    cache: QueryCache,
    subscriptions: SubscriptionManager,
    subscription: Option<Subscription>,
    sheet: Arc<ScoreSheetResponse>,
    judges: Vec<Judge>,
    selected_judge: Option<i32>,
}

impl ScoreSheetView {
    /// Subscribe to updates for `key`, then load the sheet from the server.
    ///
    /// If the push channel cannot be opened the view still mounts, without
    /// live updates.
    pub async fn mount(
        api: Arc<dyn JudgingApi>,
        cache: QueryCache,
        subscriptions: &SubscriptionManager,
        key: RoundKey,
    ) -> Result<Self> {
        let subscription = match subscriptions.subscribe(key).await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                warn!("Live updates unavailable for {}: {}", key, e);
                None
            }
        };

        // a fresh mount never trusts a sheet cached by an earlier view
        cache.invalidate(&QueryKey::ScoreSheet(key));

        let mut view = Self {
            key,
            api,
            cache,
            subscriptions: subscriptions.clone(),
            subscription,
            sheet: Arc::new(ScoreSheetResponse::default()),
            judges: Vec::new(),
            selected_judge: None,
        };
        view.refresh().await?;
        Ok(view)
    }

    pub fn key(&self) -> RoundKey {
        self.key
    }

    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn sheet(&self) -> &ScoreSheetResponse {
        &self.sheet
    }

    pub fn judges(&self) -> &[Judge] {
        &self.judges
    }

    pub fn selected_judge(&self) -> Option<&Judge> {
        let id = self.selected_judge?;
        self.judges.iter().find(|j| j.id == id)
    }

    pub fn select_judge(&mut self, judge_id: i32) -> Result<()> {
        if !self.judges.iter().any(|j| j.id == judge_id) {
            return Err(ClientError::NotFound("Judge".to_string()));
        }
        self.selected_judge = Some(judge_id);
        Ok(())
    }

    /// Load the sheet through the cache. Keeps the selected judge while they
    /// are still on the sheet, otherwise falls back to the first judge.
    pub async fn refresh(&mut self) -> Result<()> {
        let api = Arc::clone(&self.api);
        let key = self.key;
        self.sheet = self
            .cache
            .fetch(QueryKey::ScoreSheet(key), move || async move {
                api.score_sheet(key).await
            })
            .await?;

        self.judges = judges(&self.sheet);
        let still_present = self
            .selected_judge
            .is_some_and(|id| self.judges.iter().any(|j| j.id == id));
        if !still_present {
            self.selected_judge = self.judges.first().map(|j| j.id);
        }
        debug!(
            "Score sheet for {} has {} teams and {} judges",
            key,
            self.sheet.teams.len(),
            self.judges.len()
        );
        Ok(())
    }

    /// Wait for a push update of this round and refetch once.
    ///
    /// When the push channel drops, the view resubscribes after a short delay
    /// and reloads to catch up on anything it missed. Returns false when the
    /// view has no live subscription and reconnecting failed. A failed
    /// refetch leaves the view live; the next update retries it.
    pub async fn next_update(&mut self) -> Result<bool> {
        let Some(subscription) = self.subscription.as_mut() else {
            return Ok(false);
        };
        if subscription.changed().await.is_none() {
            self.subscription = None;
            return self.resubscribe().await;
        }
        // anything queued meanwhile is covered by the same refetch
        subscription.take_pending();

        info!("Score sheet for {} changed, reloading", self.key);
        self.refresh().await?;
        Ok(true)
    }

    async fn resubscribe(&mut self) -> Result<bool> {
        tokio::time::sleep(RECONNECT_DELAY).await;
        match self.subscriptions.subscribe(self.key).await {
            Ok(subscription) => {
                info!("Live updates for {} resumed", self.key);
                self.subscription = Some(subscription);
                self.cache.invalidate(&QueryKey::ScoreSheet(self.key));
                self.refresh().await?;
                Ok(true)
            }
            Err(e) => {
                warn!("Live updates for {} stopped: {}", self.key, e);
                Ok(false)
            }
        }
    }

    /// Refetch if updates arrived since the last look, without waiting.
    pub async fn apply_pending_updates(&mut self) -> Result<bool> {
        let pending = self
            .subscription
            .as_mut()
            .is_some_and(|s| s.take_pending());
        if pending {
            self.refresh().await?;
        }
        Ok(pending)
    }

    /// Criteria columns for the selected judge.
    pub fn criteria(&self) -> Vec<Criteria> {
        self.selected_judge
            .map(|id| judge_criteria(&self.sheet, id))
            .unwrap_or_default()
    }

    /// Per-team tallies for the selected judge, in sheet order.
    pub fn tallies(&self) -> Vec<(&ScoreSheetTeam, JudgeTally<'_>)> {
        let Some(id) = self.selected_judge else {
            return Vec::new();
        };
        self.sheet
            .teams
            .iter()
            .map(|team| (team, judge_tally(team, id)))
            .collect()
    }

    /// File name and contents of the selected judge's CSV.
    pub fn export_csv(&self) -> Result<(String, String)> {
        let judge = self.selected_judge().ok_or_else(|| {
            ClientError::Validation("No judge has scored this round yet".to_string())
        })?;
        let contents = score_sheet_csv(&self.sheet, judge)?;
        Ok((score_sheet_file_name(&judge.name, self.key.round_no), contents))
    }
}
