use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Open/closed state as reported by GitHub (merged PRs are also closed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrStatus {
    Open,
    Closed,
}

/// Outcome of a single review submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Approved => "approved",
            Verdict::ChangesRequested => "changes requested",
            Verdict::Commented => "commented",
            Verdict::Dismissed => "dismissed",
            Verdict::Pending => "pending",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub submitted_at: DateTime<Utc>,
    pub author: String,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub created_at: DateTime<Utc>,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub committed_at: DateTime<Utc>,
    /// None when the commit author is not linked to a GitHub account
    pub author: Option<String>,
}

/// Read-only snapshot of a pull request, fully fetched before classification
#[derive(Debug, Clone)]
pub struct PullRequest {
    pub title: String,
    pub url: String,
    pub author: String,
    pub is_draft: bool,
    pub is_merged: bool,
    pub status: PrStatus,
    pub reviews: Vec<Review>,
    pub comments: Vec<Comment>,
    pub commits: Vec<Commit>,
    pub assignees: BTreeSet<String>,
}

/// What kind of action an activity entry records. Reviews carry their verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Review(Verdict),
    Comment,
    Commit,
}

impl ActivityKind {
    /// Ordering among entries that share a timestamp
    pub(crate) fn rank(&self) -> u8 {
        match self {
            ActivityKind::Review(_) => 0,
            ActivityKind::Comment => 1,
            ActivityKind::Commit => 2,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::Review(verdict) => write!(f, "review ({})", verdict),
            ActivityKind::Comment => write!(f, "comment"),
            ActivityKind::Commit => write!(f, "commit"),
        }
    }
}

/// One entry of the merged review/comment/commit history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub time: DateTime<Utc>,
    pub user: String,
    pub kind: ActivityKind,
}

/// Workflow states, listed in evaluation priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrState {
    Draft,
    Merged,
    Closed,
    Approved,
    #[serde(rename = "Changes_Requested")]
    ChangesRequested,
    #[serde(rename = "Review_Pending")]
    ReviewPending,
    Unassigned,
}

impl PrState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrState::Draft => "Draft",
            PrState::Merged => "Merged",
            PrState::Closed => "Closed",
            PrState::Approved => "Approved",
            PrState::ChangesRequested => "Changes_Requested",
            PrState::ReviewPending => "Review_Pending",
            PrState::Unassigned => "Unassigned",
        }
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The determined state together with the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub state: PrState,
    pub reason: String,
}

impl Classification {
    pub fn new(state: PrState, reason: impl Into<String>) -> Self {
        Self {
            state,
            reason: reason.into(),
        }
    }
}
