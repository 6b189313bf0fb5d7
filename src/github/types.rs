//! Response shapes for endpoints read through the raw client instead of octocrab models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
}

/// Item of `GET /repos/{owner}/{repo}/pulls/{number}/commits`
#[derive(Debug, Clone, Deserialize)]
pub struct CommitItem {
    pub sha: String,
    /// GitHub account linked to the commit author, if any
    pub author: Option<Account>,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub author: Option<GitSignature>,
    pub committer: Option<GitSignature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitSignature {
    pub date: Option<DateTime<Utc>>,
}

impl CommitItem {
    /// Committer date, falling back to the author date
    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        self.commit
            .committer
            .as_ref()
            .and_then(|c| c.date)
            .or_else(|| self.commit.author.as_ref().and_then(|a| a.date))
    }
}

/// Item of the issue / issue-comment reactions endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Reaction {
    pub content: String,
}

/// Query parameters for page-numbered list endpoints
#[derive(Debug, Serialize)]
pub struct PageParams {
    pub per_page: u8,
    pub page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_item_deserializes_without_linked_account() {
        let json = r#"{
            "sha": "abc123",
            "author": null,
            "commit": {
                "author": { "name": "Someone", "email": "x@y.z", "date": "2024-03-01T10:00:00Z" },
                "committer": { "name": "GitHub", "email": "noreply@github.com", "date": "2024-03-01T11:00:00Z" }
            }
        }"#;
        let item: CommitItem = serde_json::from_str(json).unwrap();
        assert!(item.author.is_none());
        assert_eq!(
            item.committed_at().unwrap().to_rfc3339(),
            "2024-03-01T11:00:00+00:00"
        );
    }

    #[test]
    fn test_committed_at_falls_back_to_author_date() {
        let json = r#"{
            "sha": "abc123",
            "author": { "login": "alice", "id": 1 },
            "commit": { "author": { "date": "2024-03-01T10:00:00Z" }, "committer": null }
        }"#;
        let item: CommitItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.author.as_ref().unwrap().login, "alice");
        assert!(item.committed_at().is_some());
    }
}
