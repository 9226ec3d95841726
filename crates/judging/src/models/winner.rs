use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WinnerType {
    Winner,
    RunnerUp,
    SecondRunnerUp,
}

impl WinnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Winner => "WINNER",
            Self::RunnerUp => "RUNNER_UP",
            Self::SecondRunnerUp => "SECOND_RUNNER_UP",
        }
    }

    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl std::fmt::Display for WinnerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A finalized placement of a team within an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(rename = "eventId")]
    pub event_id: i32,
    #[serde(rename = "teamId")]
    pub team_id: i32,
    #[serde(rename = "type")]
    pub kind: WinnerType,
}
