use std::io::IsTerminal;

use super::{get_token_from_env, normalize_token, CredentialError};

/// Prompts user to enter GitHub personal access token
pub fn prompt_for_token() -> Result<String, CredentialError> {
    eprintln!("GitHub personal access token required.");
    eprintln!("Create one at: https://github.com/settings/tokens");
    eprintln!("Required scopes: repo (for private repos) or public_repo (for public only)");
    eprintln!();

    let token = rpassword::prompt_password("Enter token: ")
        .map_err(|e| CredentialError::PromptFailed(e.to_string()))?;

    normalize_token(&token)
        .ok_or_else(|| CredentialError::PromptFailed("Token cannot be empty".to_string()))
}

/// Resolve the token from the environment, falling back to an interactive
/// prompt when stdin is a terminal. The token is never stored.
pub fn resolve_token() -> Result<String, CredentialError> {
    if let Some(token) = get_token_from_env() {
        return Ok(token);
    }

    if std::io::stdin().is_terminal() {
        prompt_for_token()
    } else {
        Err(CredentialError::TokenNotFound)
    }
}
