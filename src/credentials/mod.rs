pub mod prompt;

use std::fmt;

/// Environment variables checked for a GitHub token, in order
pub const ENV_TOKEN_VARS: [&str; 2] = ["PR_STATE_GH_TOKEN", "GITHUB_TOKEN"];

pub use prompt::{prompt_for_token, resolve_token};

/// Check the token environment variables (after `.env` has been loaded).
/// Returns the first one that is set and non-empty.
pub fn get_token_from_env() -> Option<String> {
    ENV_TOKEN_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok().and_then(|v| normalize_token(&v)))
}

/// Trim a raw token, treating blank input as absent
pub fn normalize_token(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug)]
pub enum CredentialError {
    TokenNotFound,
    PromptFailed(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::TokenNotFound => write!(
                f,
                "No GitHub token found. Set {} or {}",
                ENV_TOKEN_VARS[0], ENV_TOKEN_VARS[1]
            ),
            CredentialError::PromptFailed(msg) => write!(f, "Failed to read token: {}", msg),
        }
    }
}

impl std::error::Error for CredentialError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("  ghp_abc \n"), Some("ghp_abc".to_string()));
        assert_eq!(normalize_token("   "), None);
        assert_eq!(normalize_token(""), None);
    }

    #[test]
    fn test_error_names_env_vars() {
        let msg = CredentialError::TokenNotFound.to_string();
        assert!(msg.contains("PR_STATE_GH_TOKEN"));
        assert!(msg.contains("GITHUB_TOKEN"));
    }
}
