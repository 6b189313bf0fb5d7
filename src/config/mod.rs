pub mod init;
mod schema;

pub use schema::{validate_config, Config};

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/pr-state/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join("pr-state"))
        .unwrap_or_else(|| PathBuf::from(".pr-state"))
}

/// Get the default config file path (~/.config/pr-state/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/pr-state/config.yaml)
///
/// A missing file at the default path yields the default configuration; a
/// missing file at an explicitly given path is an error.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}

/// Write configuration as YAML atomically, creating parent directories
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_missing_explicit_path_is_error() {
        let temp_path = env::temp_dir().join("pr_state_test_missing_config.yaml");
        let _ = fs::remove_file(&temp_path);

        let err = load_config(Some(temp_path)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_path = env::temp_dir()
            .join("pr_state_test_roundtrip")
            .join("config.yaml");
        let _ = fs::remove_file(&temp_path);

        let config = Config {
            default_repo: Some("acme/widgets".to_string()),
            extra_bot_logins: Some(vec!["acme-bot".to_string()]),
            ..Config::default()
        };
        save_config(&temp_path, &config).unwrap();

        let loaded = load_config(Some(temp_path.clone())).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_file(&temp_path);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let temp_path = env::temp_dir().join("pr_state_test_invalid_config.yaml");
        fs::write(&temp_path, "default_repo: [unclosed").unwrap();

        let err = load_config(Some(temp_path.clone())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));

        let _ = fs::remove_file(&temp_path);
    }
}
