mod client;

pub use client::{ApiClient, DEFAULT_API_URL, socket_origin};
