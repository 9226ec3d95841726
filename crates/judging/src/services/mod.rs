pub mod event_filter;
pub mod export;
pub mod rounds;
pub mod score_sheet;
pub mod scoring;
