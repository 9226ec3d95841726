use serde::{Deserialize, Serialize};

use crate::models::{Branch, EventCategory, RoundSchedule, TeamMember, WinnerType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerTeam {
    pub id: i32,
    pub name: String,
    #[serde(rename = "teamId", default)]
    pub code: String,
    #[serde(rename = "TeamMembers", default)]
    pub members: Vec<TeamMember>,
}

/// Winner row returned for a single event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWinner {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(rename = "type")]
    pub kind: WinnerType,
    #[serde(rename = "Team")]
    pub team: WinnerTeam,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventWinnersResponse {
    pub winners: Vec<EventWinner>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerEvent {
    pub name: String,
    #[serde(rename = "Branch", default)]
    pub branch: Option<Branch>,
    pub category: EventCategory,
    #[serde(rename = "Rounds", default)]
    pub rounds: Vec<RoundSchedule>,
}

/// Winner row of the fest-wide winners listing, used by the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerRecord {
    #[serde(rename = "type")]
    pub kind: WinnerType,
    #[serde(rename = "Event")]
    pub event: WinnerEvent,
    #[serde(rename = "Team")]
    pub team: WinnerTeam,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllWinnersResponse {
    #[serde(default)]
    pub winners: Vec<WinnerRecord>,
}
