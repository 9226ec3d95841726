pub mod api;
pub mod cache;
pub mod dashboard;
pub mod error;
pub mod notice;
pub mod realtime;
pub mod session;
pub mod traits;

pub use api::{ApiClient, DEFAULT_API_URL, socket_origin};
pub use cache::{QueryCache, QueryKey};
pub use error::{ClientError, Result};
pub use notice::{Notice, NoticeLevel};
pub use session::{Session, TokenStore};
pub use traits::JudgingApi;
