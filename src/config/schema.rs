use serde::{Deserialize, Serialize};

use crate::classify::BotLogins;
use crate::github::reference::RepoRef;

/// Contents of `~/.config/pr-state/config.yaml`. Every field is optional.
///
/// Example YAML:
/// ```yaml
/// default_repo: opensearch-project/OpenSearch-Dashboards
/// extra_bot_logins:
///   - my-release-bot
/// api_base: https://github.example.com/api/v3
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Repository used when a bare PR number is given ("owner/repo")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_repo: Option<String>,

    /// Replaces the built-in bot list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_logins: Option<Vec<String>>,

    /// Added on top of `bot_logins` (or the built-in list)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_bot_logins: Option<Vec<String>>,

    /// GitHub Enterprise API root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl Config {
    /// Repository for bare PR numbers. Call after `validate_config`.
    pub fn repo(&self) -> RepoRef {
        self.default_repo
            .as_deref()
            .and_then(|r| RepoRef::parse(r).ok())
            .unwrap_or_default()
    }

    /// Effective bot list
    pub fn bots(&self) -> BotLogins {
        let mut bots: BotLogins = match &self.bot_logins {
            Some(logins) => logins.iter().collect(),
            None => BotLogins::default(),
        };
        if let Some(extra) = &self.extra_bot_logins {
            bots.extend(extra);
        }
        bots
    }
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref repo) = config.default_repo {
        if let Err(e) = RepoRef::parse(repo) {
            errors.push(format!("default_repo: {}", e));
        }
    }

    for (field, logins) in [
        ("bot_logins", &config.bot_logins),
        ("extra_bot_logins", &config.extra_bot_logins),
    ] {
        if let Some(logins) = logins {
            for (i, login) in logins.iter().enumerate() {
                if login.trim().is_empty() {
                    errors.push(format!("{}[{}]: login must not be empty", field, i));
                }
            }
        }
    }

    if let Some(ref base) = config.api_base {
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            errors.push(format!(
                "api_base: invalid '{}' - must start with http:// or https://",
                base
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::DEFAULT_BOT_LOGINS;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.repo(), RepoRef::default());
        assert_eq!(config.bots().len(), DEFAULT_BOT_LOGINS.len());
    }

    #[test]
    fn test_all_errors_reported() {
        let config = Config {
            default_repo: Some("not-a-repo".to_string()),
            bot_logins: Some(vec!["ok-bot".to_string(), " ".to_string()]),
            extra_bot_logins: Some(vec!["".to_string()]),
            api_base: Some("github.example.com".to_string()),
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("default_repo:"));
        assert!(errors[1].starts_with("bot_logins[1]"));
        assert!(errors[2].starts_with("extra_bot_logins[0]"));
        assert!(errors[3].starts_with("api_base:"));
    }

    #[test]
    fn test_bot_logins_replace_defaults() {
        let config = Config {
            bot_logins: Some(vec!["only-bot".to_string()]),
            extra_bot_logins: Some(vec!["other-bot".to_string()]),
            ..Config::default()
        };
        let bots = config.bots();
        assert_eq!(bots.len(), 2);
        assert!(bots.contains("Only-Bot"));
        assert!(!bots.contains("dependabot[bot]"));
    }

    #[test]
    fn test_extra_bot_logins_extend_defaults() {
        let config = Config {
            extra_bot_logins: Some(vec!["my-release-bot".to_string()]),
            ..Config::default()
        };
        let bots = config.bots();
        assert!(bots.contains("dependabot[bot]"));
        assert!(bots.contains("my-release-bot"));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = "default_repo: acme/widgets\nextra_bot_logins:\n  - acme-bot\n";
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.repo(), RepoRef::new("acme", "widgets"));
        assert!(config.bots().contains("acme-bot"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = "default_repo: acme/widgets\nqueries: []\n";
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }
}
