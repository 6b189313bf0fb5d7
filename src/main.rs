use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use pr_state::classify::{activity_timeline, classify, BotLogins};
use pr_state::config::Config;
use pr_state::github::{PrReference, ReferenceKind, RepoRef};

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_INPUT: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Determine the workflow state of a pull request (default if no subcommand)
    State(StateArgs),
    /// Print a plain-text context report for a pull request or issue
    Details {
        /// PR/issue number, owner/repo#N, or pull request / issue URL
        reference: String,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Args, Debug, Default)]
struct StateArgs {
    /// PR number, owner/repo#N, or pull request URL (prompted for if omitted)
    reference: Option<String>,

    /// Repository for bare PR numbers (overrides the config file)
    #[arg(long, value_name = "OWNER/REPO")]
    repo: Option<String>,

    /// Additional bot login whose activity is ignored (repeatable)
    #[arg(long = "bot", value_name = "LOGIN")]
    bots: Vec<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
#[command(name = "pr-state")]
#[command(about = "Determine the workflow state of a GitHub pull request", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/pr-state/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(flatten)]
    state: StateArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // A .env file may carry GITHUB_TOKEN
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config_path = cli.config.map(PathBuf::from);
    let verbose = cli.verbose;
    let command = cli.command.unwrap_or(Commands::State(cli.state));

    if let Commands::Init = command {
        if let Err(e) = pr_state::config::init::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match pr_state::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = pr_state::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let exit_code = match command {
        Commands::State(args) => run_state(args, &config, verbose).await,
        Commands::Details { reference } => run_details(&reference, &config, verbose).await,
        Commands::Init => EXIT_SUCCESS,
    };

    std::process::exit(exit_code);
}

async fn run_state(args: StateArgs, config: &Config, verbose: bool) -> i32 {
    let start_time = Instant::now();

    let default_repo = match args.repo.as_deref().map(RepoRef::parse) {
        Some(Ok(repo)) => repo,
        Some(Err(e)) => {
            eprintln!("Error: {}", e);
            return EXIT_INPUT;
        }
        None => config.repo(),
    };

    let input = match args.reference {
        Some(input) => input,
        None => match pr_state::prompt::prompt("Please enter the PR number or full GitHub PR URL: ") {
            Ok(input) => input,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                return EXIT_INPUT;
            }
        },
    };

    let reference = match pr_state::github::parse_pull_reference(&input, &default_repo) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INPUT;
        }
    };

    let mut bots: BotLogins = config.bots();
    bots.extend(&args.bots);

    if verbose {
        eprintln!("Pull request: {}", reference);
        eprintln!("Ignoring activity from {} bot logins", bots.len());
    }

    let client = match connect(config, verbose) {
        Ok(client) => client,
        Err(code) => return code,
    };

    let pr = match pr_state::github::fetch_pull_request(&client, &reference, verbose).await {
        Ok(pr) => pr,
        Err(e) => return report_fetch_error(&e),
    };

    let result = classify(&pr, &bots);

    if verbose {
        eprintln!("Title: {}", pr.title);
        eprintln!("Author: @{}", pr.author);
        eprintln!("Activity (oldest first):");
        eprintln!(
            "{}",
            pr_state::output::format_timeline(
                &activity_timeline(&pr),
                &pr.author,
                &bots,
                chrono::Utc::now()
            )
        );
    }

    if args.json {
        match pr_state::output::format_classification_json(&reference, &pr, &result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                return EXIT_NETWORK;
            }
        }
    } else {
        let use_colors = pr_state::output::should_use_colors();
        println!(
            "{}",
            pr_state::output::format_classification(&result, use_colors)
        );
    }

    if verbose {
        eprintln!();
        eprintln!("Done in {}", elapsed(start_time));
    }

    EXIT_SUCCESS
}

async fn run_details(input: &str, config: &Config, verbose: bool) -> i32 {
    let start_time = Instant::now();

    let reference: PrReference = match pr_state::github::parse_reference(input, &config.repo()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INPUT;
        }
    };

    let client = match connect(config, verbose) {
        Ok(client) => client,
        Err(code) => return code,
    };

    let report = match reference.kind {
        ReferenceKind::Pull => {
            pr_state::github::fetch_pull_details(&client, &reference, verbose)
                .await
                .map(|details| pr_state::output::format_pull_details(&details))
        }
        ReferenceKind::Issue => {
            pr_state::github::fetch_issue_details(&client, &reference, verbose)
                .await
                .map(|details| pr_state::output::format_issue_details(&details))
        }
    };

    match report {
        Ok(text) => println!("{}", text),
        Err(e) => return report_fetch_error(&e),
    }

    if verbose {
        eprintln!("Done in {}", elapsed(start_time));
    }

    EXIT_SUCCESS
}

/// Resolve the token and build the client, mapping failures to exit codes
fn connect(config: &Config, verbose: bool) -> Result<octocrab::Octocrab, i32> {
    let token = match pr_state::credentials::resolve_token() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Credential error: {}", e);
            return Err(EXIT_AUTH);
        }
    };

    if verbose {
        eprintln!("Token retrieved");
    }

    pr_state::github::create_client(&token, config.api_base.as_deref()).map_err(|e| {
        eprintln!("Failed to create GitHub client: {:#}", e);
        EXIT_NETWORK
    })
}

fn report_fetch_error(e: &anyhow::Error) -> i32 {
    eprintln!("Error: {:#}", e);
    if pr_state::github::error::is_auth_failure(e) {
        EXIT_AUTH
    } else {
        EXIT_NETWORK
    }
}

fn elapsed(start: Instant) -> humantime::FormattedDuration {
    let millis = start.elapsed().as_millis() as u64;
    humantime::format_duration(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_before_subcommand() {
        let cli = Cli::try_parse_from(["pr-state", "-v", "details", "5"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Details { ref reference }) if reference == "5"));

        let cli = Cli::try_parse_from(["pr-state", "--config", "p", "init"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("p"));
        assert!(matches!(cli.command, Some(Commands::Init)));
    }

    #[test]
    fn test_bare_reference_defaults_to_state() {
        let cli = Cli::try_parse_from(["pr-state", "123"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.state.reference.as_deref(), Some("123"));
    }

    #[test]
    fn test_state_subcommand_with_flags() {
        let cli =
            Cli::try_parse_from(["pr-state", "state", "o/r#7", "--bot", "ci", "--json"]).unwrap();
        match cli.command {
            Some(Commands::State(args)) => {
                assert_eq!(args.reference.as_deref(), Some("o/r#7"));
                assert_eq!(args.bots, vec!["ci".to_string()]);
                assert!(args.json);
            }
            other => panic!("expected state command, got {:?}", other),
        }
    }
}
