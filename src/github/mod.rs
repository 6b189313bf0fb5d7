pub mod client;
pub mod details;
pub mod error;
pub mod fetch;
pub mod reference;
pub mod types;

pub use client::create_client;
pub use details::{fetch_issue_details, fetch_pull_details, IssueDetails, PullDetails};
pub use fetch::fetch_pull_request;
pub use reference::{parse_pull_reference, parse_reference, PrReference, ReferenceError, ReferenceKind, RepoRef};
