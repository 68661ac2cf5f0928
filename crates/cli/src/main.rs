//! ragdecide CLI: the main entry point.
//!
//! Commands:
//! - `classify`   Decide whether a query needs retrieval
//! - `rules`      List or validate the retrieval rules
//! - `config`     Show, validate or locate the configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "ragdecide",
    about = "ragdecide: decide whether a query needs retrieval",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Read configuration from this file instead of ~/.ragdecide/config.toml
    #[arg(short, long, global = true, env = "RAGDECIDE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a query
    Classify {
        /// The user query
        query: String,

        /// JSON file with the conversation so far (a list of {role, content})
        #[arg(long)]
        history: Option<PathBuf>,

        /// Print the full decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect retrieval rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// List rules in evaluation order
    List,
    /// Check that every rule parses
    Validate,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Validate the configuration
    Validate,
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Classify {
            query,
            history,
            json,
        } => commands::classify::run(config_path, &query, history.as_deref(), json).await?,
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(config_path).await?,
            RulesAction::Validate => commands::rules::validate(config_path).await?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config_path).await?,
            ConfigAction::Validate => commands::config_cmd::validate(config_path).await?,
            ConfigAction::Path => commands::config_cmd::path(config_path).await?,
        },
    }

    Ok(())
}
