mod criteria;
mod event;
mod judge;
mod round;
mod score;
mod team;
mod user;
mod winner;

pub use criteria::{Criteria, DEFAULT_SCORE_OUT_OF};
pub use event::{Branch, EventCategory, FEST_UTC_OFFSET_SECS, FestDays, PublicEvent, RoundSchedule};
pub(crate) use event::fest_offset;
pub use judge::Judge;
pub use round::{EventSummary, JudgeRound, RoundKey};
pub use score::Score;
pub use team::{Team, TeamMember};
pub use user::User;
pub use winner::{Winner, WinnerType};
