use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;

use crate::classify::{Activity, BotLogins, Classification, PrState, PullRequest};
use crate::github::details::{FileContent, IssueDetails, PullDetails, ReactionSummary};
use crate::github::reference::PrReference;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Two-line result: "Determined State: <state>" and "Reason: <reason>"
pub fn format_classification(result: &Classification, use_colors: bool) -> String {
    if use_colors {
        format!(
            "Determined State: {}\nReason: {}",
            colored_state(result.state),
            result.reason
        )
    } else {
        format!(
            "Determined State: {}\nReason: {}",
            result.state, result.reason
        )
    }
}

fn colored_state(state: PrState) -> String {
    let name = state.as_str();
    match state {
        PrState::Approved | PrState::Merged => name.green().bold().to_string(),
        PrState::ChangesRequested => name.red().bold().to_string(),
        PrState::ReviewPending => name.yellow().bold().to_string(),
        PrState::Draft | PrState::Closed | PrState::Unassigned => name.dimmed().to_string(),
    }
}

#[derive(Serialize)]
struct ClassificationJson<'a> {
    pull_request: String,
    title: &'a str,
    url: &'a str,
    state: PrState,
    reason: &'a str,
}

/// Machine-readable result for scripting
pub fn format_classification_json(
    reference: &PrReference,
    pr: &PullRequest,
    result: &Classification,
) -> Result<String> {
    let json = ClassificationJson {
        pull_request: reference.short_ref(),
        title: &pr.title,
        url: &pr.url,
        state: result.state,
        reason: &result.reason,
    };
    serde_json::to_string_pretty(&json).context("Failed to serialize classification")
}

/// One line per activity entry, oldest first, marking the author and bots
pub fn format_timeline(
    timeline: &[Activity],
    author: &str,
    bots: &BotLogins,
    now: DateTime<Utc>,
) -> String {
    if timeline.is_empty() {
        return "  (no activity)".to_string();
    }

    timeline
        .iter()
        .map(|activity| {
            let role = if bots.contains(&activity.user) {
                " [bot]"
            } else if activity.user == author {
                " [author]"
            } else {
                ""
            };
            format!(
                "  {:>5} ago  {}  @{}{}",
                format_age(now - activity.time),
                activity.kind,
                activity.user,
                role
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

/// Render non-zero reaction counts with emoji, in `REACTION_KINDS` order
pub fn format_reactions(summary: &ReactionSummary) -> String {
    const EMOJI: [&str; 8] = [
        "\u{1F44D}",
        "\u{1F44E}",
        "\u{1F604}",
        "\u{1F615}",
        "\u{2764}\u{FE0F}",
        "\u{1F389}",
        "\u{1F680}",
        "\u{1F440}",
    ];
    summary
        .counts
        .iter()
        .zip(EMOJI)
        .filter(|(count, _)| **count > 0)
        .map(|(count, emoji)| format!("{} {}", emoji, count))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plain-text report of a pull request: description, diff and base-branch files
pub fn format_pull_details(details: &PullDetails) -> String {
    let number = details.reference.number;
    let mut out = String::new();

    out.push_str(&format!("Pull Request #{}\n", number));
    out.push_str(&format!("Title: {}\n\n", details.title));
    out.push_str(&format!("Description:\n{}\n\n", details.body));
    out.push_str(&format!("Base Branch: {}\n\n", details.base_branch));
    out.push_str(&format!("Full diff for PR #{}:\n\n{}\n\n", number, details.diff));
    out.push_str(&format!("Files changed in PR #{}:\n\n", number));

    for file in &details.files {
        out.push_str(&format!("\n\n--- {} ---\n\n", file.path));
        match &file.content {
            FileContent::Text(text) => out.push_str(text),
            FileContent::Missing => out.push_str(
                "File not found in base branch. This might be a new file added in the PR.\n",
            ),
            FileContent::Unavailable(reason) => {
                out.push_str(&format!("Content unavailable: {}\n", reason))
            }
        }
    }

    out
}

/// Plain-text report of an issue with its comments
pub fn format_issue_details(details: &IssueDetails) -> String {
    let mut out = String::new();

    out.push_str(&format!("Issue #{}\n", details.reference.number));
    out.push_str(&format!("Title: {}\n\n", details.title));
    out.push_str(&format!("Description:\n{}\n\n", details.body));
    out.push_str(&format!("State: {}\n", details.state));
    out.push_str(&format!("Labels: {}\n", details.labels.join(", ")));
    out.push_str(&format!("Assignees: {}\n", details.assignees.join(", ")));
    out.push_str(&format!("Author: {}\n", details.author));
    out.push_str(&format!("Created: {}\n", details.created_at.to_rfc3339()));
    out.push_str(&format!("Updated: {}\n", details.updated_at.to_rfc3339()));
    if let Some(closed_at) = details.closed_at {
        out.push_str(&format!("Closed: {}\n", closed_at.to_rfc3339()));
    }
    out.push_str(&format!("Reactions: {}\n", format_reactions(&details.reactions)));

    out.push_str("\nComments:\n\n");
    for comment in &details.comments {
        out.push_str(&format!(
            "--- Comment by {} on {} ---\n",
            comment.author,
            comment.created_at.to_rfc3339()
        ));
        out.push_str(&format!("{}\n", comment.body));
        out.push_str(&format!(
            "Reactions: {}\n\n",
            format_reactions(&comment.reactions)
        ));
    }

    out
}
