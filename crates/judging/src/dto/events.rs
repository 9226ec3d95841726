use serde::{Deserialize, Serialize};

use crate::models::{FestDays, PublicEvent};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishedEventsResponse {
    #[serde(default)]
    pub events: Vec<PublicEvent>,
    #[serde(default)]
    pub days: FestDays,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedEventResponse {
    pub event: PublicEvent,
}
