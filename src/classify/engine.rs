use super::bots::BotLogins;
use super::types::{Activity, ActivityKind, Classification, PrState, PrStatus, PullRequest, Verdict};

/// `Approved` requires strictly more approving reviews than this.
pub const APPROVAL_THRESHOLD: usize = 1;

/// Determine the workflow state of a pull request.
///
/// Rules are evaluated in priority order and the first match wins:
/// draft, merged, closed, approval quorum, then the last non-bot activity.
/// Every snapshot maps to exactly one state.
pub fn classify(pr: &PullRequest, bots: &BotLogins) -> Classification {
    if pr.is_draft {
        return Classification::new(PrState::Draft, "Pull request is marked as draft");
    }

    if pr.is_merged {
        return Classification::new(PrState::Merged, "Pull request has been merged");
    }

    if pr.status == PrStatus::Closed {
        return Classification::new(PrState::Closed, "Pull request was closed without merging");
    }

    let approvals = pr
        .reviews
        .iter()
        .filter(|review| review.verdict == Verdict::Approved)
        .count();
    if approvals > APPROVAL_THRESHOLD {
        return Classification::new(
            PrState::Approved,
            format!(
                "{} approving reviews (more than {} required)",
                approvals, APPROVAL_THRESHOLD
            ),
        );
    }

    let timeline = activity_timeline(pr);
    let last_human = timeline.iter().rev().find(|a| !bots.contains(&a.user));

    match last_human {
        None => classify_without_human_activity(pr, timeline.is_empty()),
        Some(last) if last.user == pr.author => Classification::new(
            PrState::ReviewPending,
            format!(
                "Last activity was a {} by the author @{}; awaiting review",
                last.kind, last.user
            ),
        ),
        Some(last) => classify_reviewer_activity(last, approvals),
    }
}

/// Merge reviews, comments and commits into one list sorted by time.
///
/// Commits without a linked account are dropped. Entries with equal timestamps
/// are ordered reviews, then comments, then commits, then by login.
pub fn activity_timeline(pr: &PullRequest) -> Vec<Activity> {
    let reviews = pr.reviews.iter().map(|review| Activity {
        time: review.submitted_at,
        user: review.author.clone(),
        kind: ActivityKind::Review(review.verdict),
    });
    let comments = pr.comments.iter().map(|comment| Activity {
        time: comment.created_at,
        user: comment.author.clone(),
        kind: ActivityKind::Comment,
    });
    let commits = pr.commits.iter().filter_map(|commit| {
        commit.author.as_ref().map(|author| Activity {
            time: commit.committed_at,
            user: author.clone(),
            kind: ActivityKind::Commit,
        })
    });

    let mut timeline: Vec<Activity> = reviews.chain(comments).chain(commits).collect();

    // Stable sort: identical (time, kind, login) entries keep input order
    timeline.sort_by(|a, b| {
        a.time
            .cmp(&b.time)
            .then_with(|| a.kind.rank().cmp(&b.kind.rank()))
            .then_with(|| a.user.to_lowercase().cmp(&b.user.to_lowercase()))
    });

    timeline
}

fn classify_without_human_activity(pr: &PullRequest, no_activity: bool) -> Classification {
    if pr.assignees.is_empty() {
        let reason = if no_activity {
            "No activity and no assignees"
        } else {
            "All activity was bot-authored and there are no assignees"
        };
        return Classification::new(PrState::Unassigned, reason);
    }

    let assignees = pr
        .assignees
        .iter()
        .map(|a| format!("@{}", a))
        .collect::<Vec<_>>()
        .join(", ");
    let reason = if no_activity {
        format!("No activity yet, but assigned to {}", assignees)
    } else {
        format!("All activity was bot-authored, but assigned to {}", assignees)
    };
    Classification::new(PrState::ReviewPending, reason)
}

fn approval_count(approvals: usize) -> String {
    if approvals == 1 {
        "1 approval".to_string()
    } else {
        format!("{} approvals", approvals)
    }
}

fn classify_reviewer_activity(last: &Activity, approvals: usize) -> Classification {
    match last.kind {
        ActivityKind::Review(Verdict::Approved) => Classification::new(
            PrState::ReviewPending,
            format!(
                "Last activity was an approval by @{} ({}, at least {} required); awaiting additional review",
                last.user,
                approval_count(approvals),
                APPROVAL_THRESHOLD + 1
            ),
        ),
        ActivityKind::Review(verdict) => Classification::new(
            PrState::ChangesRequested,
            format!(
                "Last activity was a review by @{} ({}); changes expected from the author",
                last.user, verdict
            ),
        ),
        ActivityKind::Comment | ActivityKind::Commit => Classification::new(
            PrState::ChangesRequested,
            format!(
                "Last activity was a {} by @{}, not the author; changes expected from the author",
                last.kind, last.user
            ),
        ),
    }
}
