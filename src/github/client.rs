use anyhow::{Context, Result};
use octocrab::Octocrab;

/// Create an authenticated GitHub client using a personal access token.
///
/// `api_base` points the client at a GitHub Enterprise API root instead of api.github.com.
pub fn create_client(token: &str, api_base: Option<&str>) -> Result<Octocrab> {
    let mut builder = Octocrab::builder().personal_token(token.to_string());
    if let Some(base) = api_base {
        builder = builder
            .base_uri(base)
            .with_context(|| format!("Invalid GitHub API base URL: {}", base))?;
    }
    builder.build().context("Failed to create GitHub client")
}
