use anyhow::{anyhow, bail, Context, Result};
use octocrab::models::pulls::ReviewState;
use octocrab::models::IssueState;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use crate::classify::{Comment, Commit, PrStatus, PullRequest, Review, Verdict};
use crate::github::error::{describe_api_error, is_retryable};
use crate::github::reference::PrReference;
use crate::github::types::{CommitItem, PageParams};

/// Login GitHub shows for deleted accounts
pub const GHOST_LOGIN: &str = "ghost";

const PER_PAGE: u8 = 100;
const MAX_PAGES: u32 = 10;
/// The pull request commits endpoint never lists more than this
const PULL_COMMITS_LIMIT: usize = 250;

/// Fetch metadata, reviews, comments and commits of a pull request and
/// normalize them into a classification snapshot.
///
/// The four requests run concurrently. Any failure is fatal: a partial
/// snapshot is never returned.
pub async fn fetch_pull_request(
    client: &Octocrab,
    reference: &PrReference,
    verbose: bool,
) -> Result<PullRequest> {
    let (pr, reviews, comments, commits) = tokio::try_join!(
        fetch_metadata(client, reference),
        fetch_reviews(client, reference),
        fetch_comments(client, reference),
        fetch_commits(client, reference),
    )
    .with_context(|| format!("Failed to fetch pull request {}", reference))?;

    if verbose {
        eprintln!(
            "Fetched {}: {} reviews, {} comments, {} commits",
            reference,
            reviews.len(),
            comments.len(),
            commits.len()
        );
    }

    normalize(reference, pr, reviews, comments, commits)
}

/// Build the snapshot from raw API responses
fn normalize(
    reference: &PrReference,
    pr: octocrab::models::pulls::PullRequest,
    reviews: Vec<octocrab::models::pulls::Review>,
    comments: Vec<octocrab::models::issues::Comment>,
    commits: Vec<CommitItem>,
) -> Result<PullRequest> {
    let author = pr
        .user
        .as_ref()
        .map(|user| user.login.clone())
        .ok_or_else(|| anyhow!("Pull request {} has no author", reference))?;

    ensure_complete_commits(reference, pr.commits, commits.len())?;

    let status = match pr.state {
        Some(IssueState::Closed) => PrStatus::Closed,
        _ => PrStatus::Open,
    };

    let url = pr
        .html_url
        .as_ref()
        .map(|u| u.to_string())
        .unwrap_or_else(|| {
            format!(
                "https://github.com/{}/pull/{}",
                reference.repo, reference.number
            )
        });

    let assignees: BTreeSet<String> = pr
        .assignees
        .unwrap_or_default()
        .into_iter()
        .map(|assignee| assignee.login)
        .collect();

    let reviews = reviews
        .into_iter()
        .filter_map(|review| {
            // Unsubmitted (pending) reviews have no timestamp and are not activity yet
            let submitted_at = review.submitted_at?;
            Some(Review {
                submitted_at,
                author: login_or_ghost(review.user.as_ref().map(|u| u.login.as_str())),
                verdict: verdict_from_state(review.state.as_ref()),
            })
        })
        .collect();

    let comments = comments
        .into_iter()
        .map(|comment| Comment {
            created_at: comment.created_at,
            author: comment.user.login,
        })
        .collect();

    let commits = commits
        .iter()
        .map(commit_from_item)
        .collect::<Result<Vec<_>>>()?;

    Ok(PullRequest {
        title: pr.title.unwrap_or_default(),
        url,
        author,
        is_draft: pr.draft.unwrap_or(false),
        is_merged: pr.merged_at.is_some(),
        status,
        reviews,
        comments,
        commits,
        assignees,
    })
}

/// Refuse to classify when GitHub listed fewer commits than the PR holds.
/// `total` is the count reported in the PR metadata, when present.
fn ensure_complete_commits(
    reference: &PrReference,
    total: Option<u64>,
    fetched: usize,
) -> Result<()> {
    let truncated = match total {
        Some(total) => total > fetched as u64,
        None => fetched >= PULL_COMMITS_LIMIT,
    };
    if truncated {
        let total = total.map_or_else(|| "more".to_string(), |t| t.to_string());
        bail!(
            "Pull request {} has {} commits but GitHub lists only the first {}; \
             the latest commits are missing, so its state cannot be determined",
            reference,
            total,
            fetched
        );
    }
    Ok(())
}

async fn fetch_metadata(
    client: &Octocrab,
    reference: &PrReference,
) -> Result<octocrab::models::pulls::PullRequest> {
    // Retry strategy: exponential backoff with 3 attempts
    let retry_strategy = ExponentialBackoff::from_millis(100)
        .max_delay(Duration::from_secs(5))
        .take(3);

    RetryIf::start(
        retry_strategy,
        || async {
            client
                .pulls(reference.owner(), reference.name())
                .get(reference.number)
                .await
        },
        is_retryable,
    )
    .await
    .map_err(describe_api_error)
}

async fn fetch_reviews(
    client: &Octocrab,
    reference: &PrReference,
) -> Result<Vec<octocrab::models::pulls::Review>> {
    let first_page = client
        .pulls(reference.owner(), reference.name())
        .list_reviews(reference.number)
        .send()
        .await
        .map_err(describe_api_error)?;

    client
        .all_pages(first_page)
        .await
        .map_err(describe_api_error)
        .context("Failed to fetch PR reviews")
}

async fn fetch_comments(
    client: &Octocrab,
    reference: &PrReference,
) -> Result<Vec<octocrab::models::issues::Comment>> {
    let first_page = client
        .issues(reference.owner(), reference.name())
        .list_comments(reference.number)
        .send()
        .await
        .map_err(describe_api_error)?;

    client
        .all_pages(first_page)
        .await
        .map_err(describe_api_error)
        .context("Failed to fetch PR comments")
}

async fn fetch_commits(client: &Octocrab, reference: &PrReference) -> Result<Vec<CommitItem>> {
    let route = format!(
        "/repos/{}/{}/pulls/{}/commits",
        reference.owner(),
        reference.name(),
        reference.number
    );
    get_paginated(client, &route)
        .await
        .context("Failed to fetch PR commits")
}

/// GET a page-numbered list endpoint until a short page comes back
pub(crate) async fn get_paginated<T: DeserializeOwned>(
    client: &Octocrab,
    route: &str,
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let params = PageParams {
            per_page: PER_PAGE,
            page,
        };
        let batch: Vec<T> = client
            .get(route, Some(&params))
            .await
            .map_err(describe_api_error)?;
        let last_page = batch.len() < PER_PAGE as usize;
        items.extend(batch);
        if last_page || page >= MAX_PAGES {
            break;
        }
        page += 1;
    }
    Ok(items)
}

fn verdict_from_state(state: Option<&ReviewState>) -> Verdict {
    match state {
        Some(ReviewState::Approved) => Verdict::Approved,
        Some(ReviewState::ChangesRequested) => Verdict::ChangesRequested,
        Some(ReviewState::Dismissed) => Verdict::Dismissed,
        Some(ReviewState::Pending) => Verdict::Pending,
        _ => Verdict::Commented,
    }
}

fn login_or_ghost(login: Option<&str>) -> String {
    login.unwrap_or(GHOST_LOGIN).to_string()
}

fn commit_from_item(item: &CommitItem) -> Result<Commit> {
    let committed_at = item
        .committed_at()
        .ok_or_else(|| anyhow!("Commit {} has no author or committer date", item.sha))?;
    Ok(Commit {
        committed_at,
        author: item.author.as_ref().map(|account| account.login.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::reference::{ReferenceKind, RepoRef};
    use serde_json::{json, Value};

    fn item(json: &str) -> CommitItem {
        serde_json::from_str(json).unwrap()
    }

    fn reference() -> PrReference {
        PrReference {
            repo: RepoRef::new("owner", "repo"),
            number: 7,
            kind: ReferenceKind::Pull,
        }
    }

    fn user(login: &str) -> Value {
        let base = format!("https://api.github.com/users/{}", login);
        json!({
            "login": login,
            "id": 1,
            "node_id": "U_1",
            "avatar_url": "https://avatars.githubusercontent.com/u/1",
            "gravatar_id": "",
            "url": base,
            "html_url": format!("https://github.com/{}", login),
            "followers_url": format!("{}/followers", base),
            "following_url": format!("{}/following", base),
            "gists_url": format!("{}/gists", base),
            "starred_url": format!("{}/starred", base),
            "subscriptions_url": format!("{}/subscriptions", base),
            "organizations_url": format!("{}/orgs", base),
            "repos_url": format!("{}/repos", base),
            "events_url": format!("{}/events", base),
            "received_events_url": format!("{}/received_events", base),
            "type": "User",
            "site_admin": false
        })
    }

    fn pull(overrides: Value) -> Value {
        let mut pr = json!({
            "url": "https://api.github.com/repos/owner/repo/pulls/7",
            "id": 70,
            "number": 7,
            "state": "open",
            "title": "Fix login bug",
            "html_url": "https://github.com/owner/repo/pull/7",
            "user": user("alice"),
            "draft": false,
            "merged_at": null,
            "assignees": [user("carol")],
            "commits": 1,
            "head": { "ref": "fix", "sha": "abc" },
            "base": { "ref": "main", "sha": "def" }
        });
        if let (Some(pr), Some(overrides)) = (pr.as_object_mut(), overrides.as_object()) {
            for (key, value) in overrides {
                pr.insert(key.clone(), value.clone());
            }
        }
        pr
    }

    fn review(login: &str, state: &str, submitted_at: Value) -> Value {
        json!({
            "id": 1,
            "node_id": "R_1",
            "html_url": "https://github.com/owner/repo/pull/7#pullrequestreview-1",
            "user": user(login),
            "state": state,
            "submitted_at": submitted_at
        })
    }

    fn comment(login: &str, created_at: &str) -> Value {
        json!({
            "id": 2,
            "node_id": "C_2",
            "url": "https://api.github.com/repos/owner/repo/issues/comments/2",
            "html_url": "https://github.com/owner/repo/pull/7#issuecomment-2",
            "user": user(login),
            "created_at": created_at
        })
    }

    fn commit_json() -> Value {
        json!({
            "sha": "abc",
            "author": { "login": "alice" },
            "commit": { "author": null, "committer": { "date": "2024-03-01T09:00:00Z" } }
        })
    }

    fn run_normalize(pr: Value, reviews: Vec<Value>, comments: Vec<Value>) -> Result<PullRequest> {
        normalize(
            &reference(),
            serde_json::from_value(pr).unwrap(),
            reviews
                .into_iter()
                .map(|r| serde_json::from_value(r).unwrap())
                .collect(),
            comments
                .into_iter()
                .map(|c| serde_json::from_value(c).unwrap())
                .collect(),
            vec![serde_json::from_value(commit_json()).unwrap()],
        )
    }

    #[test]
    fn test_normalize_open_pull_request() {
        let pr = run_normalize(
            pull(json!({})),
            vec![
                review("bob", "APPROVED", json!("2024-03-01T10:00:00Z")),
                review("dave", "PENDING", Value::Null),
            ],
            vec![comment("carol", "2024-03-01T11:00:00Z")],
        )
        .unwrap();

        assert_eq!(pr.author, "alice");
        assert_eq!(pr.url, "https://github.com/owner/repo/pull/7");
        assert_eq!(pr.status, PrStatus::Open);
        assert!(!pr.is_draft);
        assert!(!pr.is_merged);
        assert!(pr.assignees.contains("carol"));
        assert_eq!(pr.reviews.len(), 1);
        assert_eq!(pr.reviews[0].author, "bob");
        assert_eq!(pr.reviews[0].verdict, Verdict::Approved);
        assert_eq!(pr.comments[0].author, "carol");
        assert_eq!(pr.commits[0].author.as_deref(), Some("alice"));
    }

    #[test]
    fn test_normalize_merged_and_closed() {
        let pr = run_normalize(
            pull(json!({ "state": "closed", "merged_at": "2024-03-02T00:00:00Z" })),
            vec![],
            vec![],
        )
        .unwrap();
        assert!(pr.is_merged);
        assert_eq!(pr.status, PrStatus::Closed);

        let pr = run_normalize(pull(json!({ "state": "closed" })), vec![], vec![]).unwrap();
        assert!(!pr.is_merged);
        assert_eq!(pr.status, PrStatus::Closed);
    }

    #[test]
    fn test_normalize_requires_author() {
        let err = run_normalize(pull(json!({ "user": null })), vec![], vec![]).unwrap_err();
        assert!(err.to_string().contains("has no author"));
    }

    #[test]
    fn test_normalize_rejects_truncated_commit_history() {
        let err = run_normalize(pull(json!({ "commits": 300 })), vec![], vec![]).unwrap_err();
        assert!(err.to_string().contains("300 commits"));
    }

    #[test]
    fn test_commit_limit_without_reported_total() {
        assert!(ensure_complete_commits(&reference(), None, 249).is_ok());
        assert!(ensure_complete_commits(&reference(), None, PULL_COMMITS_LIMIT).is_err());
        assert!(ensure_complete_commits(&reference(), Some(250), 250).is_ok());
    }

    #[test]
    fn test_verdict_mapping() {
        assert_eq!(
            verdict_from_state(Some(&ReviewState::Approved)),
            Verdict::Approved
        );
        assert_eq!(
            verdict_from_state(Some(&ReviewState::ChangesRequested)),
            Verdict::ChangesRequested
        );
        assert_eq!(verdict_from_state(None), Verdict::Commented);
    }

    #[test]
    fn test_deleted_account_becomes_ghost() {
        assert_eq!(login_or_ghost(None), "ghost");
        assert_eq!(login_or_ghost(Some("alice")), "alice");
    }

    #[test]
    fn test_commit_without_account_has_no_author() {
        let commit = commit_from_item(&item(
            r#"{"sha": "a1", "author": null, "commit": {"author": {"date": "2024-03-01T10:00:00Z"}, "committer": null}}"#,
        ))
        .unwrap();
        assert!(commit.author.is_none());
    }

    #[test]
    fn test_commit_without_date_fails() {
        let result = commit_from_item(&item(
            r#"{"sha": "a1", "author": {"login": "alice"}, "commit": {"author": null, "committer": null}}"#,
        ));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("a1"));
    }
}
