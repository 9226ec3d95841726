use std::sync::Arc;

use judging::dto::events::PublishedEventsResponse;
use judging::dto::winners::{EventWinner, WinnerRecord};
use judging::services::event_filter::EventFilter;
use judging::services::export::winners_csv;
use judging::services::rounds::{default_round_index, sorted_schedule};
use judging::{PublicEvent, RoundSchedule};
use tracing::info;

use crate::Result;
use crate::cache::{QueryCache, QueryKey};
use crate::traits::JudgingApi;

/// Round tabs of one event and the tab opened first.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTabs {
    pub rounds: Vec<RoundSchedule>,
    pub default_index: usize,
}

impl RoundTabs {
    pub fn from_event(event: &PublicEvent) -> Self {
        let rounds = sorted_schedule(&event.rounds);
        let default_index = default_round_index(&rounds, event.is_started);
        Self {
            rounds,
            default_index,
        }
    }

    pub fn default_round(&self) -> Option<&RoundSchedule> {
        self.rounds.get(self.default_index)
    }
}

/// Read-only browser over published events and their winners.
#[derive(Clone)]
pub struct JuryBrowser {
    api: Arc<dyn JudgingApi>,
    cache: QueryCache,
}

impl JuryBrowser {
    pub fn new(api: Arc<dyn JudgingApi>, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    async fn published(&self) -> Result<Arc<PublishedEventsResponse>> {
        let api = Arc::clone(&self.api);
        self.cache
            .fetch(QueryKey::PublishedEvents, move || async move {
                api.published_events().await
            })
            .await
    }

    /// Published events matching `filter`, in server order.
    pub async fn events(&self, filter: &EventFilter) -> Result<Vec<PublicEvent>> {
        let published = self.published().await?;
        Ok(filter
            .apply(&published.events, &published.days)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn event(&self, event_id: i32) -> Result<Arc<PublicEvent>> {
        let api = Arc::clone(&self.api);
        self.cache
            .fetch(QueryKey::PublishedEvent(event_id), move || async move {
                api.published_event(event_id).await
            })
            .await
    }

    pub async fn round_tabs(&self, event_id: i32) -> Result<RoundTabs> {
        let event = self.event(event_id).await?;
        Ok(RoundTabs::from_event(&event))
    }

    pub async fn event_winners(&self, event_id: i32) -> Result<Arc<Vec<EventWinner>>> {
        let api = Arc::clone(&self.api);
        self.cache
            .fetch(QueryKey::EventWinners(event_id), move || async move {
                api.event_winners(event_id).await
            })
            .await
    }

    pub async fn all_winners(&self) -> Result<Arc<Vec<WinnerRecord>>> {
        let api = Arc::clone(&self.api);
        self.cache
            .fetch(QueryKey::AllWinners, move || async move {
                api.all_winners().await
            })
            .await
    }

    /// Winners CSV across all events. `None` when no winners are declared.
    pub async fn export_winners(&self) -> Result<Option<String>> {
        let winners = self.all_winners().await?;
        if winners.is_empty() {
            info!("No winners declared yet, nothing to export");
            return Ok(None);
        }
        Ok(Some(winners_csv(&winners)?))
    }
}
