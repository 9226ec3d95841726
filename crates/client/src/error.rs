use judging::JudgingError;
use reqwest::StatusCode;
use thiserror::Error;

use crate::notice::Notice;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server rejected request ({status}): {message}")]
    Server { status: StatusCode, message: String },

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Notification channel error: {0}")]
    Channel(String),

    #[error("Session storage error: {0}")]
    Session(#[from] std::io::Error),

    #[error(transparent)]
    Judging(#[from] JudgingError),
}

impl ClientError {
    /// Local validation failures are caught before any request is issued.
    pub fn is_local(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Judging(e) => e.is_validation(),
            _ => false,
        }
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Short message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Authorization(_) => "You are not authorized for this action".to_string(),
            Self::NotFound(what) => format!("{} was not found", what),
            Self::Validation(msg) => msg.clone(),
            Self::Judging(JudgingError::Validation(msg))
            | Self::Judging(JudgingError::InvalidSelection(msg)) => msg.clone(),
            Self::Network(_) => "Could not reach the server".to_string(),
            Self::Server { message, .. } => message.clone(),
            _ => "Something went wrong".to_string(),
        }
    }

    pub fn notice(&self) -> Notice {
        Notice::error(self.user_message())
    }
}
