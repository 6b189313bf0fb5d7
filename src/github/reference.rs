use std::fmt;

/// Repository used when the input is a bare number and nothing else is configured
pub const DEFAULT_OWNER: &str = "opensearch-project";
pub const DEFAULT_REPO: &str = "OpenSearch-Dashboards";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// Parse "owner/repo"
    pub fn parse(input: &str) -> Result<Self, ReferenceError> {
        match input.trim().split_once('/') {
            Some((owner, name)) if is_valid_segment(owner) && is_valid_segment(name) => {
                Ok(Self::new(owner, name))
            }
            _ => Err(ReferenceError::InvalidRepo(input.to_string())),
        }
    }
}

impl Default for RepoRef {
    fn default() -> Self {
        Self::new(DEFAULT_OWNER, DEFAULT_REPO)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Pull,
    Issue,
}

/// A pull request (or issue) located in a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrReference {
    pub repo: RepoRef,
    pub number: u64,
    pub kind: ReferenceKind,
}

impl PrReference {
    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    pub fn name(&self) -> &str {
        &self.repo.name
    }

    /// Return a short reference in the format "owner/repo#123"
    pub fn short_ref(&self) -> String {
        format!("{}#{}", self.repo, self.number)
    }
}

impl fmt::Display for PrReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    Empty,
    InvalidNumber(String),
    InvalidRepo(String),
    Unrecognized(String),
    NotAPullRequest(String),
}

impl fmt::Display for ReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceError::Empty => write!(f, "No input provided"),
            ReferenceError::InvalidNumber(n) => {
                write!(f, "Invalid PR number '{}': must be a positive integer", n)
            }
            ReferenceError::InvalidRepo(r) => {
                write!(f, "Invalid repository '{}': expected owner/repo", r)
            }
            ReferenceError::Unrecognized(input) => write!(
                f,
                "Invalid input '{}'. Please provide either a PR number or a full GitHub PR URL",
                input
            ),
            ReferenceError::NotAPullRequest(input) => {
                write!(f, "'{}' refers to an issue, not a pull request", input)
            }
        }
    }
}

impl std::error::Error for ReferenceError {}

/// Parse a PR number, "owner/repo#N", or a GitHub pull/issue URL.
///
/// Bare numbers resolve against `default_repo`. URLs may carry extra path
/// segments (e.g. `/files`), a query string, or a fragment.
pub fn parse_reference(input: &str, default_repo: &RepoRef) -> Result<PrReference, ReferenceError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ReferenceError::Empty);
    }

    if input.chars().all(|c| c.is_ascii_digit()) {
        return Ok(PrReference {
            repo: default_repo.clone(),
            number: parse_number(input)?,
            kind: ReferenceKind::Pull,
        });
    }

    if let Some(rest) = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
    {
        return parse_url_path(rest, input);
    }

    if let Some((repo, number)) = input.split_once('#') {
        return Ok(PrReference {
            repo: RepoRef::parse(repo)?,
            number: parse_number(number)?,
            kind: ReferenceKind::Pull,
        });
    }

    Err(ReferenceError::Unrecognized(input.to_string()))
}

/// Like `parse_reference`, but rejects issue URLs
pub fn parse_pull_reference(
    input: &str,
    default_repo: &RepoRef,
) -> Result<PrReference, ReferenceError> {
    let reference = parse_reference(input, default_repo)?;
    if reference.kind != ReferenceKind::Pull {
        return Err(ReferenceError::NotAPullRequest(input.trim().to_string()));
    }
    Ok(reference)
}

/// Parse "<host>/<owner>/<repo>/(pull|issues)/<number>[/...]"
fn parse_url_path(rest: &str, input: &str) -> Result<PrReference, ReferenceError> {
    let without_fragment = rest.split('#').next().unwrap_or_default();
    let path = without_fragment.split('?').next().unwrap_or_default();
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if parts.len() < 5 {
        return Err(ReferenceError::Unrecognized(input.to_string()));
    }

    let kind = match parts[3] {
        "pull" | "pulls" => ReferenceKind::Pull,
        "issues" => ReferenceKind::Issue,
        _ => return Err(ReferenceError::Unrecognized(input.to_string())),
    };

    Ok(PrReference {
        repo: RepoRef::new(parts[1], parts[2]),
        number: parse_number(parts[4])?,
        kind,
    })
}

fn parse_number(s: &str) -> Result<u64, ReferenceError> {
    match s.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ReferenceError::InvalidNumber(s.to_string())),
    }
}

fn is_valid_segment(s: &str) -> bool {
    !s.is_empty() && !s.contains('/') && !s.chars().any(char::is_whitespace)
}
