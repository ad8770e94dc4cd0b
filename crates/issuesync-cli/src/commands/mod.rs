//! CLI command implementations.

pub mod sync;

use anyhow::{Context, Result};
use issuesync_config::validate::check_pattern as compile_check;
use issuesync_config::{TrackerSettings, load_settings};
use issuesync_tracker::{check_credentials, check_url as probe_url};
use std::path::Path;

pub async fn check_url(url: &str) -> Result<()> {
    probe_url(url).await?;
    println!("Success");
    Ok(())
}

/// Log in with the given credentials, falling back to the settings file.
pub async fn login(
    config: &Path,
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let stored = match url {
        Some(_) => None,
        None => Some(
            load_settings(config)
                .with_context(|| format!("Failed to load settings: {}", config.display()))?
                .tracker,
        ),
    };
    let (url, username, password) = credentials(stored.as_ref(), url, username, password);

    check_credentials(url.as_deref(), username.as_deref(), password.as_deref()).await?;
    println!("Success");
    Ok(())
}

fn credentials(
    stored: Option<&TrackerSettings>,
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> (Option<String>, Option<String>, Option<String>) {
    let url = url.or_else(|| stored.map(|t| t.url.clone()));
    let username = username.or_else(|| stored.and_then(|t| t.username.clone()));
    let password = password.or_else(|| stored.and_then(TrackerSettings::resolved_password));
    (url, username, password)
}

pub fn check_pattern(pattern: &str) -> Result<()> {
    compile_check(pattern)?;
    println!("Pattern is valid");
    Ok(())
}

pub fn validate(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    let checked = issuesync_config::parse_settings(&content).and_then(|settings| {
        settings.tracker.connection()?;
        settings.step.resolve(&settings.defaults)
    });
    match checked {
        Ok(_) => {
            println!("Configuration is valid");
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}

pub fn issue_url(config: &Path, key: &str) -> Result<()> {
    let settings = load_settings(config)
        .with_context(|| format!("Failed to load settings: {}", config.display()))?;
    let connection = settings.tracker.connection()?;
    println!("{}", connection.resolve_issue_url(key)?);
    Ok(())
}
