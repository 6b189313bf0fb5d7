pub mod classify;
pub mod config;
pub mod credentials;
pub mod github;
pub mod output;
pub mod prompt;
