//! Build step interface and run results.

use crate::log::BuildLog;
use async_trait::async_trait;
use issuesync_config::VariableContext;
use issuesync_core::Result;
use issuesync_core::build::BuildHistory;
use issuesync_core::tracker::{IssueTracker, TrackerConnection};
use serde::Serialize;
use std::sync::Arc;

/// Everything the host hands a step for one build.
pub struct StepContext<'a> {
    /// Current build followed by its ancestors.
    pub history: &'a BuildHistory,
    /// Variables used to expand step templates.
    pub variables: &'a VariableContext,
    /// Tracker location and credentials.
    pub connection: &'a TrackerConnection,
    /// Tracker implementation sessions are opened against.
    pub tracker: Arc<dyn IssueTracker>,
    /// Build log sink.
    pub log: &'a mut dyn BuildLog,
}

/// A unit of work the host runs once per build.
#[async_trait]
pub trait BuildStep: Send + Sync {
    /// Name of this step.
    fn name(&self) -> &'static str;

    /// Run the step. An `Err` marks the step as failed.
    async fn perform(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome>;
}

/// How a run ended. Every variant is a success from the host's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// No change-log entry matched the pattern; nothing was sent.
    NoIssueKeys,
    /// No extracted issue is in the target status.
    NoMatchingIssues { keys: Vec<String> },
    /// Issues were processed.
    Updated(SyncReport),
    /// A tracker error was logged and swallowed.
    Failed { message: String },
}

/// What happened to each issue during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Keys extracted from the change logs.
    pub keys: Vec<String>,
    /// Per-issue results, in the order the tracker returned the issues.
    pub issues: Vec<(String, IssueOutcome)>,
}

impl SyncReport {
    pub fn outcome(&self, key: &str) -> Option<&IssueOutcome> {
        self.issues
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, outcome)| outcome)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IssueOutcome {
    /// The comment was already present; the issue was left alone.
    AlreadyCommented,
    /// The comment was added; no matching workflow action was available.
    Commented,
    /// The comment was added and the workflow action invoked.
    Transitioned { action: String },
}
