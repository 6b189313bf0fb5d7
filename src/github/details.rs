use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use octocrab::models::IssueState;
use octocrab::Octocrab;

use crate::github::error::{describe_api_error, is_not_found};
use crate::github::fetch::get_paginated;
use crate::github::reference::PrReference;
use crate::github::types::Reaction;

const MAX_CONCURRENT_FETCHES: usize = 8;

/// GitHub reaction kinds, in display order
pub const REACTION_KINDS: [&str; 8] = [
    "+1", "-1", "laugh", "confused", "heart", "hooray", "rocket", "eyes",
];

/// Per-kind reaction counts, indexed like `REACTION_KINDS`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionSummary {
    pub counts: [u32; 8],
}

impl ReactionSummary {
    pub fn from_reactions(reactions: &[Reaction]) -> Self {
        let mut summary = Self::default();
        for reaction in reactions {
            if let Some(idx) = REACTION_KINDS.iter().position(|k| *k == reaction.content) {
                summary.counts[idx] += 1;
            }
        }
        summary
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// Base-branch content of a file touched by a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    /// Not present on the base branch (typically added by the PR)
    Missing,
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct ChangedFile {
    pub path: String,
    pub content: FileContent,
}

#[derive(Debug, Clone)]
pub struct PullDetails {
    pub reference: PrReference,
    pub title: String,
    pub body: String,
    pub base_branch: String,
    pub diff: String,
    pub files: Vec<ChangedFile>,
}

#[derive(Debug, Clone)]
pub struct IssueComment {
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub body: String,
    pub reactions: ReactionSummary,
}

#[derive(Debug, Clone)]
pub struct IssueDetails {
    pub reference: PrReference,
    pub title: String,
    pub body: String,
    pub state: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub reactions: ReactionSummary,
    pub comments: Vec<IssueComment>,
}

/// Collect title, description, diff and base-branch file contents of a pull request
pub async fn fetch_pull_details(
    client: &Octocrab,
    reference: &PrReference,
    verbose: bool,
) -> Result<PullDetails> {
    let pulls = client.pulls(reference.owner(), reference.name());

    let pr = pulls
        .get(reference.number)
        .await
        .map_err(describe_api_error)
        .with_context(|| format!("Failed to fetch pull request {}", reference))?;

    let diff = pulls
        .get_diff(reference.number)
        .await
        .map_err(describe_api_error)
        .context("Failed to fetch PR diff")?;

    let base_branch = pr.base.ref_field.clone();
    let paths = parse_diff_files(&diff);

    if verbose {
        eprintln!(
            "Fetching {} changed files from base branch '{}'",
            paths.len(),
            base_branch
        );
    }

    // Bounded concurrency, results kept in diff order
    let files = stream::iter(paths)
        .map(|path| {
            let branch = base_branch.clone();
            async move {
                let content = fetch_file_content(client, reference, &path, &branch).await;
                ChangedFile { path, content }
            }
        })
        .buffered(MAX_CONCURRENT_FETCHES)
        .collect::<Vec<_>>()
        .await;

    Ok(PullDetails {
        reference: reference.clone(),
        title: pr.title.unwrap_or_default(),
        body: pr.body.unwrap_or_default(),
        base_branch,
        diff,
        files,
    })
}

async fn fetch_file_content(
    client: &Octocrab,
    reference: &PrReference,
    path: &str,
    branch: &str,
) -> FileContent {
    let result = client
        .repos(reference.owner(), reference.name())
        .get_content()
        .path(path)
        .r#ref(branch)
        .send()
        .await;

    match result {
        Ok(contents) => match contents.items.first().and_then(|c| c.decoded_content()) {
            Some(text) => FileContent::Text(text),
            None => FileContent::Unavailable("not a regular text file".to_string()),
        },
        Err(e) if is_not_found(&e) => FileContent::Missing,
        Err(e) => {
            eprintln!("Warning: Failed to fetch {}: {}", path, e);
            FileContent::Unavailable(describe_api_error(e).to_string())
        }
    }
}

/// Collect an issue with its labels, reactions and comments
pub async fn fetch_issue_details(
    client: &Octocrab,
    reference: &PrReference,
    verbose: bool,
) -> Result<IssueDetails> {
    let issues = client.issues(reference.owner(), reference.name());

    let issue = issues
        .get(reference.number)
        .await
        .map_err(describe_api_error)
        .with_context(|| format!("Failed to fetch issue {}", reference))?;

    let reactions_route = format!(
        "/repos/{}/{}/issues/{}/reactions",
        reference.owner(),
        reference.name(),
        reference.number
    );
    let reactions: Vec<Reaction> = get_paginated(client, &reactions_route)
        .await
        .context("Failed to fetch issue reactions")?;

    let first_page = issues
        .list_comments(reference.number)
        .send()
        .await
        .map_err(describe_api_error)?;
    let comments = client
        .all_pages(first_page)
        .await
        .map_err(describe_api_error)
        .context("Failed to fetch issue comments")?;

    if verbose {
        eprintln!("Fetching reactions for {} comments", comments.len());
    }

    let comments = stream::iter(comments)
        .map(|comment| async move {
            let route = format!(
                "/repos/{}/{}/issues/comments/{}/reactions",
                reference.owner(),
                reference.name(),
                comment.id.0
            );
            let reactions: Vec<Reaction> = get_paginated(client, &route)
                .await
                .context("Failed to fetch comment reactions")?;
            Ok::<_, anyhow::Error>(IssueComment {
                author: comment.user.login,
                created_at: comment.created_at,
                body: comment.body.unwrap_or_default(),
                reactions: ReactionSummary::from_reactions(&reactions),
            })
        })
        .buffered(MAX_CONCURRENT_FETCHES)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    let state = match issue.state {
        IssueState::Closed => "closed",
        _ => "open",
    };

    Ok(IssueDetails {
        reference: reference.clone(),
        title: issue.title,
        body: issue.body.unwrap_or_default(),
        state: state.to_string(),
        labels: issue.labels.into_iter().map(|label| label.name).collect(),
        assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
        author: issue.user.login,
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        closed_at: issue.closed_at,
        reactions: ReactionSummary::from_reactions(&reactions),
        comments,
    })
}

/// Paths named by `diff --git a/<path> b/<path>` headers, in diff order
pub fn parse_diff_files(diff: &str) -> Vec<String> {
    diff.lines()
        .filter_map(|line| line.strip_prefix("diff --git a/"))
        .filter_map(|rest| rest.split_once(" b/").map(|(a, _)| a.to_string()))
        .collect()
}
