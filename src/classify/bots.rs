use std::collections::HashSet;

/// Automation accounts ignored when looking for the last human action
pub const DEFAULT_BOT_LOGINS: &[&str] = &[
    "dependabot[bot]",
    "github-actions[bot]",
    "codecov[bot]",
    "mergify[bot]",
    "renovate[bot]",
    "opensearch-trigger-bot[bot]",
    "opensearch-ci-bot",
];

/// Case-insensitive set of bot logins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotLogins {
    logins: HashSet<String>,
}

impl BotLogins {
    /// Empty set: every author counts as human
    pub fn none() -> Self {
        Self {
            logins: HashSet::new(),
        }
    }

    pub fn insert(&mut self, login: &str) {
        let login = login.trim();
        if !login.is_empty() {
            self.logins.insert(login.to_lowercase());
        }
    }

    pub fn contains(&self, login: &str) -> bool {
        self.logins.contains(&login.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.logins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }
}

impl Default for BotLogins {
    fn default() -> Self {
        DEFAULT_BOT_LOGINS.iter().copied().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for BotLogins {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut bots = BotLogins::none();
        bots.extend(iter);
        bots
    }
}

impl<S: AsRef<str>> Extend<S> for BotLogins {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for login in iter {
            self.insert(login.as_ref());
        }
    }
}
