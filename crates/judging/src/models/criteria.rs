use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum score applied when a criteria does not carry its own `scoreOutOf`.
pub const DEFAULT_SCORE_OUT_OF: i32 = 10;

/// A named, bounded scoring dimension within a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    pub id: i32,
    pub name: String,
    #[serde(rename = "scoreOutOf", default)]
    pub score_out_of: Option<i32>,
}

impl Criteria {
    pub fn new(id: i32, name: impl Into<String>, score_out_of: Option<i32>) -> Self {
        Self {
            id,
            name: name.into(),
            score_out_of,
        }
    }

    pub fn max_score(&self) -> i32 {
        self.score_out_of.unwrap_or(DEFAULT_SCORE_OUT_OF)
    }

    pub fn max_decimal(&self) -> Decimal {
        Decimal::from(self.max_score())
    }

    /// Column label used by the score sheet export, e.g. `Design (Max 10)`.
    pub fn column_label(&self) -> String {
        format!("{} (Max {})", self.name, self.max_score())
    }
}
