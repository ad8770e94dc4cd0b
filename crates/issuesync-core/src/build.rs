//! Builds and their change logs.
//!
//! A [`BuildHistory`] is the current build followed by its ancestors, newest
//! first. Each build carries the change-log entries (commits) that went into it.

use serde::{Deserialize, Serialize};

/// A single commit associated with a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    /// Full commit message.
    pub message: String,
    /// Commit author, if the source control reports one.
    #[serde(default)]
    pub author: Option<String>,
    /// Commit identifier (e.g. git SHA).
    #[serde(default)]
    pub commit_id: Option<String>,
}

impl ChangeLogEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            author: None,
            commit_id: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_commit_id(mut self, commit_id: impl Into<String>) -> Self {
        self.commit_id = Some(commit_id.into());
        self
    }
}

/// One build of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    /// Sequential build number.
    pub number: u32,
    /// Optional host-specific identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Change-log entries recorded for this build.
    #[serde(default)]
    pub changes: Vec<ChangeLogEntry>,
}

impl Build {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            id: None,
            changes: Vec::new(),
        }
    }

    pub fn with_change(mut self, entry: ChangeLogEntry) -> Self {
        self.changes.push(entry);
        self
    }
}

/// The current build followed by its ancestors, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildHistory {
    pub builds: Vec<Build>,
}

impl BuildHistory {
    pub fn new(builds: Vec<Build>) -> Self {
        Self { builds }
    }

    /// The build currently running, if any.
    pub fn current(&self) -> Option<&Build> {
        self.builds.first()
    }

    /// The current build plus up to `previous` ancestors.
    pub fn window(&self, previous: usize) -> impl Iterator<Item = &Build> {
        self.builds.iter().take(previous.saturating_add(1))
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }
}
