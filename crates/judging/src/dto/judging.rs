use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Criteria, Judge, JudgeRound, RoundKey, Team};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundsResponse {
    pub rounds: Vec<JudgeRound>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsResponse {
    pub teams: Vec<Team>,
}

/// Body of a single-field score submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitScoreRequest {
    #[serde(rename = "teamId")]
    pub team_id: i32,
    #[serde(rename = "criteriaId")]
    pub criteria_id: i32,
    pub score: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetScore {
    pub score: Decimal,
    #[serde(rename = "Judge")]
    pub judge: Judge,
    #[serde(rename = "Criteria")]
    pub criteria: Criteria,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSheetTeam {
    pub id: i32,
    pub name: String,
    #[serde(rename = "teamId", default)]
    pub code: String,
    #[serde(rename = "Score", default)]
    pub scores: Vec<SheetScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSheetResponse {
    pub teams: Vec<ScoreSheetTeam>,
}

/// Payload of the `score-update` push event.
pub type ScoreUpdate = RoundKey;
