use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A judge's score for one criteria of one team.
///
/// The API transports `score` as a decimal string; plain JSON numbers are
/// accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    #[serde(rename = "teamId", default)]
    pub team_id: Option<i32>,
    #[serde(rename = "criteriaId")]
    pub criteria_id: i32,
    #[serde(rename = "judgeId", default)]
    pub judge_id: Option<i32>,
    pub score: Decimal,
}
