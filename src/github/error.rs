use anyhow::anyhow;

/// Turn an octocrab error into a message a user can act on
pub fn describe_api_error(e: octocrab::Error) -> anyhow::Error {
    match known_failure(&format!("{:?}", e)) {
        Some(message) => anyhow!(message),
        None => anyhow!("GitHub API error: {}", e),
    }
}

fn known_failure(error_str: &str) -> Option<&'static str> {
    if error_str.contains("Not Found") || error_str.contains("resources do not exist") {
        Some("Pull request, issue or repository not found. Check the reference and token permissions (needs 'repo' scope for private repos).")
    } else if error_str.contains("401") || error_str.contains("Bad credentials") {
        Some("Authentication failed. Your GitHub token may be invalid or expired.")
    } else if error_str.contains("rate limit") || error_str.contains("403") {
        Some("GitHub API rate limit exceeded. Wait a few minutes and try again.")
    } else {
        None
    }
}

/// True when the error is GitHub answering 404
pub fn is_not_found(e: &octocrab::Error) -> bool {
    api_status(e) == Some(http::StatusCode::NOT_FOUND)
}

/// HTTP status of an error GitHub answered with
fn api_status(e: &octocrab::Error) -> Option<http::StatusCode> {
    match e {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code),
        _ => None,
    }
}

/// Missing resources and rejected credentials stay that way on retry
pub fn is_retryable_status(status: http::StatusCode) -> bool {
    !matches!(
        status,
        http::StatusCode::NOT_FOUND | http::StatusCode::UNAUTHORIZED | http::StatusCode::FORBIDDEN
    )
}

/// True for transport failures and server-side errors worth another attempt
pub fn is_retryable(e: &octocrab::Error) -> bool {
    api_status(e).map_or(true, is_retryable_status)
}

/// Exit-code classification for a failed run
pub fn is_auth_failure(e: &anyhow::Error) -> bool {
    e.chain()
        .any(|cause| cause.to_string().starts_with("Authentication failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_detected_through_context() {
        let err = anyhow!("Authentication failed. Your GitHub token may be invalid or expired.")
            .context("Failed to fetch pull request owner/repo#1");
        assert!(is_auth_failure(&err));
    }

    #[test]
    fn test_not_found_message_covers_issues() {
        let message = known_failure("GitHubError { message: \"Not Found\" }").unwrap();
        assert!(message.starts_with("Pull request, issue or repository not found"));
        assert!(known_failure("connection reset").is_none());
    }

    #[test]
    fn test_client_errors_are_not_retried() {
        assert!(!is_retryable_status(http::StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(http::StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(http::StatusCode::FORBIDDEN));
    }

    #[test]
    fn test_server_errors_are_retried() {
        assert!(is_retryable_status(http::StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(http::StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_other_errors_are_not_auth_failures() {
        let err = anyhow!("GitHub API rate limit exceeded. Wait a few minutes and try again.");
        assert!(!is_auth_failure(&err));
    }
}
