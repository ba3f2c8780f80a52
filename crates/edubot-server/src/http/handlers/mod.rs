//! HTTP request handlers.

mod chat;
mod health;
mod session;

pub use chat::chat;
pub use health::{health_check, metrics_handler};
pub use session::start_session;
