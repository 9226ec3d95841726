pub mod auth;
pub mod events;
pub mod judging;
pub mod winners;
