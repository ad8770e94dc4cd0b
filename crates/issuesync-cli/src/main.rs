//! issuesync CLI tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod history;

#[derive(Parser)]
#[command(name = "issuesync")]
#[command(about = "Update tracker issues referenced by build change logs", long_about = None)]
struct Cli {
    /// Settings file
    #[arg(long, env = "ISSUESYNC_CONFIG", default_value = "issuesync.kdl")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Comment on and transition the issues referenced by a build
    Sync(commands::sync::SyncArgs),
    /// Check that a tracker URL exposes the SOAP service
    CheckUrl {
        /// Tracker base URL
        url: String,
    },
    /// Check tracker credentials by logging in once
    Login {
        /// Tracker base URL (defaults to the settings file)
        #[arg(long)]
        url: Option<String>,
        /// User name
        #[arg(long)]
        username: Option<String>,
        /// Password
        #[arg(long, env = "ISSUESYNC_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Check that an issue pattern compiles
    CheckPattern {
        /// Regular expression
        pattern: String,
    },
    /// Validate a settings file
    Validate {
        /// Path to the settings file (defaults to --config)
        path: Option<PathBuf>,
    },
    /// Print the browse URL of an issue
    IssueUrl {
        /// Issue key
        key: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync(args) => {
            commands::sync::run(&cli.config, args).await?;
        }
        Commands::CheckUrl { url } => {
            commands::check_url(&url).await?;
        }
        Commands::Login {
            url,
            username,
            password,
        } => {
            commands::login(&cli.config, url, username, password).await?;
        }
        Commands::CheckPattern { pattern } => {
            commands::check_pattern(&pattern)?;
        }
        Commands::Validate { path } => {
            commands::validate(path.as_deref().unwrap_or(&cli.config))?;
        }
        Commands::IssueUrl { key } => {
            commands::issue_url(&cli.config, &key)?;
        }
    }

    Ok(())
}
