pub mod dto;
pub mod error;
pub mod models;
pub mod services;

pub use error::{JudgingError, Result};
pub use models::{
    Criteria, EventCategory, FestDays, Judge, JudgeRound, PublicEvent, RoundKey, RoundSchedule,
    Score, Team, TeamMember, User, Winner, WinnerType,
};
