pub mod formatter;

pub use formatter::{
    format_age, format_classification, format_classification_json, format_issue_details,
    format_pull_details, format_reactions, format_timeline, should_use_colors,
};
