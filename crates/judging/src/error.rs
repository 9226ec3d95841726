use thiserror::Error;

#[derive(Debug, Error)]
pub enum JudgingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    CsvBuffer(String),
}

pub type Result<T> = std::result::Result<T, JudgingError>;

impl JudgingError {
    pub fn is_validation(&self) -> bool {
        matches!(self, JudgingError::Validation(_))
    }
}
