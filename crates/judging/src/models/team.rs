use serde::{Deserialize, Serialize};

use super::{Score, User, Winner};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(rename = "User")]
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i32,
    /// Human-readable team code shown to judges.
    #[serde(rename = "teamId", default)]
    pub code: String,
    pub name: String,
    #[serde(rename = "leaderId", default)]
    pub leader_id: Option<i32>,
    #[serde(rename = "TeamMembers", default)]
    pub members: Vec<TeamMember>,
    #[serde(rename = "Score", default)]
    pub scores: Vec<Score>,
    #[serde(rename = "Winners", default)]
    pub winners: Vec<Winner>,
}

impl Team {
    pub fn score_for(&self, criteria_id: i32) -> Option<&Score> {
        self.scores.iter().find(|s| s.criteria_id == criteria_id)
    }

    /// Case-insensitive match on the team name or code; an empty query matches everything.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.code.to_lowercase().contains(&query)
    }
}
