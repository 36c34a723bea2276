//! Revassign CLI - reviewer assignment for pull requests
//!
//! Every command prints JSON on stdout. Logs go to stderr.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use revassign_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{error_body, exit_code, print_json, PrArgs, Services, TeamArgs, UserArgs};

/// Revassign: automatic reviewer assignment for pull requests
#[derive(Parser, Debug)]
#[command(name = "revassign")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the SQLite database (overrides config and env)
    #[arg(long, global = true, env = "REVASSIGN_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage teams and their members
    Team(TeamArgs),

    /// Manage user activity and review queues
    #[command(visible_alias = "u")]
    User(UserArgs),

    /// Create, merge and reassign pull requests
    Pr(PrArgs),

    /// Show total users and pull requests
    Stats,

    /// Show current configuration
    Config,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if let Err(err) = run(cli).await {
        tracing::debug!(error = %err, code = err.code(), "Command failed");
        println!("{}", serde_json::to_string_pretty(&error_body(&err))?);
        std::process::exit(exit_code(&err));
    }

    Ok(())
}

async fn run(cli: Cli) -> revassign_core::Result<()> {
    let config = Config::load_with_overrides(cli.db.clone())?;

    if cli.verbose {
        tracing::info!(
            db_path = %config.database.resolved_path().display(),
            reviewers_per_pr = config.assignment.reviewers_per_pr,
            search_width = config.assignment.reassign_search_width,
            "Configuration loaded"
        );
    }

    let command = match cli.command {
        Some(Commands::Version) => {
            println!("revassign {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(Commands::Config) => {
            let config_file = Config::default_config_path();
            let config_file_exists = config_file.as_ref().is_some_and(|p| p.exists());
            return print_json(&serde_json::json!({
                "config": config,
                "config_file": config_file,
                "config_file_exists": config_file_exists,
                "database_path": config.database.resolved_path(),
            }));
        }
        None => {
            println!("Revassign - reviewer assignment for pull requests");
            println!();
            println!("Use --help for usage information");
            return Ok(());
        }
        Some(command) => command,
    };

    let services = Services::open(&config).await?;

    let result = match command {
        Commands::Team(args) => args.execute(&services).await,
        Commands::User(args) => args.execute(&services).await,
        Commands::Pr(args) => args.execute(&services).await,
        Commands::Stats => services
            .users
            .global_stats()
            .await
            .and_then(|stats| print_json(&stats)),
        Commands::Config | Commands::Version => Ok(()),
    };

    services.close().await;
    result
}
