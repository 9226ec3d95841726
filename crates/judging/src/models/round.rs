use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Criteria;

/// Identity of a round: the owning event and the round's sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoundKey {
    #[serde(rename = "eventId")]
    pub event_id: i32,
    #[serde(rename = "roundNo")]
    pub round_no: i32,
}

impl RoundKey {
    pub fn new(event_id: i32, round_no: i32) -> Self {
        Self { event_id, round_no }
    }
}

impl std::fmt::Display for RoundKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event {} round {}", self.event_id, self.round_no)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: i32,
    pub name: String,
    #[serde(rename = "eventType", default)]
    pub event_type: Option<String>,
}

/// A round the current judge is assigned to, with its criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeRound {
    #[serde(rename = "eventId")]
    pub event_id: i32,
    #[serde(rename = "roundNo")]
    pub round_no: i32,
    #[serde(rename = "isCompleted", default)]
    pub is_completed: bool,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "Event")]
    pub event: EventSummary,
    #[serde(rename = "Criteria", default)]
    pub criteria: Vec<Criteria>,
}

impl JudgeRound {
    pub fn key(&self) -> RoundKey {
        RoundKey::new(self.event_id, self.round_no)
    }

    pub fn event_name(&self) -> &str {
        &self.event.name
    }

    pub fn find_criteria(&self, criteria_id: i32) -> Option<&Criteria> {
        self.criteria.iter().find(|c| c.id == criteria_id)
    }
}
