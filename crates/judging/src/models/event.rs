use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::JudgingError;

/// Fest days and round dates are reasoned about in IST.
pub const FEST_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

pub(crate) fn fest_offset() -> FixedOffset {
    FixedOffset::east_opt(FEST_UTC_OFFSET_SECS).expect("IST offset is in range")
}

/// Day of month of `date` in fest local time.
pub(crate) fn fest_day_of_month(date: &DateTime<Utc>) -> u32 {
    date.with_timezone(&fest_offset()).day()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    Technical,
    NonTechnical,
    Core,
    Special,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "TECHNICAL",
            Self::NonTechnical => "NON_TECHNICAL",
            Self::Core => "CORE",
            Self::Special => "SPECIAL",
        }
    }

    pub fn all() -> &'static [EventCategory] {
        &[Self::Technical, Self::NonTechnical, Self::Core, Self::Special]
    }

    fn parse_str(s: &str) -> Result<Self, JudgingError> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "TECHNICAL" => Ok(Self::Technical),
            "NON_TECHNICAL" | "NONTECHNICAL" => Ok(Self::NonTechnical),
            "CORE" => Ok(Self::Core),
            "SPECIAL" => Ok(Self::Special),
            _ => Err(JudgingError::Validation(format!(
                "Unknown category: '{}'. Available: {}",
                s,
                Self::all()
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

impl std::str::FromStr for EventCategory {
    type Err = JudgingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(default)]
    pub id: Option<i32>,
    pub name: String,
}

/// Scheduling information for a round as exposed by the public event endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSchedule {
    #[serde(rename = "roundNo")]
    pub round_no: i32,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "isCompleted", default)]
    pub is_completed: bool,
}

impl RoundSchedule {
    pub fn falls_on_day(&self, day: &DateTime<Utc>) -> bool {
        self.date
            .as_ref()
            .is_some_and(|date| fest_day_of_month(date) == fest_day_of_month(day))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicEvent {
    pub id: i32,
    pub name: String,
    pub category: EventCategory,
    #[serde(rename = "eventType")]
    pub event_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "Branch", alias = "branch", default)]
    pub branch: Option<Branch>,
    #[serde(rename = "isStarted", default)]
    pub is_started: bool,
    #[serde(default)]
    pub rounds: Vec<RoundSchedule>,
}

impl PublicEvent {
    /// `TEAM_MULTIPLE_ENTRY` -> `TEAM MULTIPLE ENTRY`
    pub fn event_type_label(&self) -> String {
        self.event_type.replace('_', " ")
    }
}

/// Calendar dates of the three fest days, any of which may be unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FestDays {
    #[serde(default)]
    pub day1: Option<DateTime<Utc>>,
    #[serde(default)]
    pub day2: Option<DateTime<Utc>>,
    #[serde(default)]
    pub day3: Option<DateTime<Utc>>,
}

impl FestDays {
    /// `day` is 1-based.
    pub fn day(&self, day: u8) -> Option<&DateTime<Utc>> {
        match day {
            1 => self.day1.as_ref(),
            2 => self.day2.as_ref(),
            3 => self.day3.as_ref(),
            _ => None,
        }
    }
}
