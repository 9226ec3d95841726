use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::Criteria;
use crate::{JudgingError, Result};

/// Check `0 <= value <= criteria.scoreOutOf`.
pub fn validate_score(value: Decimal, criteria: &Criteria) -> Result<Decimal> {
    if value < Decimal::ZERO {
        return Err(JudgingError::Validation(format!(
            "Score for '{}' cannot be negative (got {})",
            criteria.name, value
        )));
    }
    if value > criteria.max_decimal() {
        return Err(JudgingError::Validation(format!(
            "Score for '{}' must be at most {} (got {})",
            criteria.name,
            criteria.max_score(),
            value
        )));
    }
    Ok(value)
}

/// Parse raw judge input and validate it against the criteria bounds.
pub fn parse_score(input: &str, criteria: &Criteria) -> Result<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(JudgingError::Validation(format!(
            "Score for '{}' is empty",
            criteria.name
        )));
    }
    let value = Decimal::from_str(trimmed).map_err(|_| {
        JudgingError::Validation(format!(
            "Score for '{}' is not a number: '{}'",
            criteria.name, trimmed
        ))
    })?;
    validate_score(value, criteria)
}
