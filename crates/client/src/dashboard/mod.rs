mod drafts;
mod jury;
mod score_sheet;
mod scoring;
mod selection;

pub use drafts::{CommitOutcome, FieldKey, PendingCommit, ScoreDrafts};
pub use jury::{JuryBrowser, RoundTabs};
pub use score_sheet::ScoreSheetView;
pub use scoring::{CommitReport, JudgingDashboard, RoundListing};
pub use selection::{Selection, SelectionState};
