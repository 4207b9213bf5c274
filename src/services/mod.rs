pub mod articles;
pub mod auth;
pub mod feed;
pub mod recommendations;
pub mod saves;
pub mod summarizers;
pub mod summary;
pub mod votes;

pub use auth::AuthService;
pub use summarizers::{GeminiSummarizer, Summarizer};
