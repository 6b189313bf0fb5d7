pub mod bots;
pub mod engine;
pub mod types;

pub use bots::{BotLogins, DEFAULT_BOT_LOGINS};
pub use engine::{activity_timeline, classify, APPROVAL_THRESHOLD};
pub use types::*;
