use crate::models::{EventCategory, FestDays, PublicEvent, Team};
use crate::{JudgingError, Result};

/// Day selector of the jury event browser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayFilter {
    #[default]
    All,
    Day(u8),
}

impl std::str::FromStr for DayFilter {
    type Err = JudgingError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_uppercase().replace([' ', '-', '_'], "");
        match normalized.as_str() {
            "ALL" | "" => Ok(Self::All),
            "DAY1" | "1" => Ok(Self::Day(1)),
            "DAY2" | "2" => Ok(Self::Day(2)),
            "DAY3" | "3" => Ok(Self::Day(3)),
            _ => Err(JudgingError::Validation(format!(
                "Unknown day filter: '{}'. Use ALL, DAY 1, DAY 2 or DAY 3",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub search: String,
    pub category: Option<EventCategory>,
    pub day: DayFilter,
}

impl EventFilter {
    pub fn apply<'a>(&self, events: &'a [PublicEvent], days: &FestDays) -> Vec<&'a PublicEvent> {
        let search = self.search.trim().to_lowercase();
        // An unset fest day leaves the list unfiltered.
        let target_day = match self.day {
            DayFilter::All => None,
            DayFilter::Day(n) => days.day(n),
        };

        events
            .iter()
            .filter(|e| search.is_empty() || e.name.to_lowercase().contains(&search))
            .filter(|e| self.category.is_none_or(|c| e.category == c))
            .filter(|e| target_day.is_none_or(|day| e.rounds.iter().any(|r| r.falls_on_day(day))))
            .collect()
    }
}

pub fn filter_teams<'a>(teams: &'a [Team], query: &str) -> Vec<&'a Team> {
    teams.iter().filter(|t| t.matches_search(query)).collect()
}
