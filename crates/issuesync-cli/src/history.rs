//! Build history sources for the sync command.
//!
//! Either a JSON file written by the CI host:
//!
//! ```json
//! {"builds": [{"number": 42, "changes": [{"message": "PROJ-1 fix", "author": "dev"}]}]}
//! ```
//!
//! or a git revision range, read as the change log of a single build.

use anyhow::{Context, Result};
use issuesync_core::build::{Build, BuildHistory, ChangeLogEntry};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/// Read a history file. Builds are listed newest first.
pub fn load_json(path: &Path) -> Result<BuildHistory> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file: {}", path.display()))?;
    parse_json(&content).with_context(|| format!("Invalid history file: {}", path.display()))
}

pub fn parse_json(content: &str) -> Result<BuildHistory> {
    let history: BuildHistory = serde_json::from_str(content)?;
    if history.is_empty() {
        anyhow::bail!("History contains no builds");
    }
    Ok(history)
}

/// Read the commits in `range` as the change log of build `number`.
pub async fn from_git(repo: &Path, range: &str, number: u32) -> Result<BuildHistory> {
    debug!(repo = %repo.display(), range, "Reading git log");
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["log", "--format=%H%x1f%an%x1f%B%x1e", range])
        .output()
        .await
        .context("Failed to run git")?;

    if !output.status.success() {
        anyhow::bail!(
            "git log {} failed: {}",
            range,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let build = parse_git_log(&stdout)
        .into_iter()
        .fold(Build::new(number), Build::with_change);
    Ok(BuildHistory::new(vec![build]))
}

fn parse_git_log(output: &str) -> Vec<ChangeLogEntry> {
    output
        .split(RECORD_SEP)
        .filter_map(|record| {
            let mut fields = record.trim_start_matches('\n').splitn(3, FIELD_SEP);
            let sha = fields.next().filter(|s| !s.is_empty())?;
            let author = fields.next()?;
            let message = fields.next()?.trim_end();
            Some(
                ChangeLogEntry::new(message)
                    .with_author(author)
                    .with_commit_id(sha),
            )
        })
        .collect()
}
