use anyhow::Result;
use std::path::PathBuf;

use crate::classify::DEFAULT_BOT_LOGINS;
use crate::config::{get_config_path, save_config, Config};
use crate::github::reference::RepoRef;
use crate::prompt::{prompt, prompt_with_default, prompt_yes_no};

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("PR State Configuration Wizard");
    println!("=============================");
    println!();

    // 1. Default repository for bare PR numbers
    println!("A bare PR number (e.g. `pr-state 123`) is looked up in the default repository.");
    let default_repo = loop {
        let input = prompt_with_default("Default repository", &RepoRef::default().to_string())?;
        match RepoRef::parse(&input) {
            Ok(repo) => break repo,
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };
    let default_repo = if default_repo == RepoRef::default() {
        None
    } else {
        Some(default_repo.to_string())
    };

    // 2. Bots
    println!();
    println!("Activity from bot accounts is ignored when deciding who acted last.");
    println!("Built-in bots: {}", DEFAULT_BOT_LOGINS.join(", "));
    let mut extra: Vec<String> = Vec::new();
    let mut add_bot = prompt_yes_no("Add another bot login?", false)?;
    while add_bot {
        let login = prompt("  Bot login: ")?;
        if login.is_empty() {
            println!("  Login is required.");
            continue;
        }
        extra.push(login);
        add_bot = prompt_yes_no("  Add another bot login?", false)?;
    }

    // 3. GitHub Enterprise
    println!();
    let api_base = if prompt_yes_no("Use a GitHub Enterprise server?", false)? {
        loop {
            let base = prompt("  API base URL (e.g. https://github.example.com/api/v3): ")?;
            if base.starts_with("https://") || base.starts_with("http://") {
                break Some(base);
            }
            println!("  Invalid: must start with http:// or https://. Try again.");
        }
    } else {
        None
    };

    // 4. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config
    let config = Config {
        default_repo,
        bot_logins: None,
        extra_bot_logins: if extra.is_empty() { None } else { Some(extra) },
        api_base,
    };
    save_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `pr-state <PR number or URL>` to get started.");

    Ok(())
}
