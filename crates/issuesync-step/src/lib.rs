//! Issue update build step for issuesync.
//!
//! Scans the change logs of the current build and its ancestors for issue
//! keys, then comments on and transitions the matching issues in the tracker.

pub mod extract;
pub mod log;
pub mod step;
pub mod update;

#[cfg(test)]
mod fake;

pub use extract::extract_issue_keys;
pub use log::{BuildLog, LogLevel, MemoryLog, WriterLog};
pub use step::{BuildStep, IssueOutcome, StepContext, StepOutcome, SyncReport};
pub use update::IssueUpdateStep;
