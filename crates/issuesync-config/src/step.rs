//! Issue update step parameters.

use crate::settings::Defaults;
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Step fields as written in configuration or given on the command line.
/// Every field is optional until resolved against [`Defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSettings {
    pub issue_pattern: Option<String>,
    pub comment: Option<String>,
    pub status: Option<String>,
    pub action: Option<String>,
    pub previous_builds: Option<usize>,
    pub fail_on_error: Option<bool>,
}

impl StepSettings {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: StepSettings) -> StepSettings {
        StepSettings {
            issue_pattern: other.issue_pattern.or(self.issue_pattern),
            comment: other.comment.or(self.comment),
            status: other.status.or(self.status),
            action: other.action.or(self.action),
            previous_builds: other.previous_builds.or(self.previous_builds),
            fail_on_error: other.fail_on_error.or(self.fail_on_error),
        }
    }

    /// Fill missing templates from the global defaults and check required fields.
    pub fn resolve(self, defaults: &Defaults) -> ConfigResult<SyncParameters> {
        let issue_pattern = self
            .issue_pattern
            .or_else(|| defaults.issue_pattern.clone())
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("issue-pattern".to_string()))?;

        let comment = self
            .comment
            .or_else(|| defaults.comment.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("comment".to_string()))?;

        let status = self
            .status
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("status".to_string()))?;

        let action = self.action.filter(|a| !a.trim().is_empty());

        Ok(SyncParameters {
            issue_pattern,
            comment,
            status,
            action,
            previous_builds: self.previous_builds.unwrap_or(0),
            fail_on_error: self.fail_on_error.unwrap_or(false),
        })
    }
}

/// Fully resolved parameters of one issue update step.
///
/// `issue_pattern` and `comment` are templates; they are expanded against the
/// build's variables at run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncParameters {
    /// Regular expression matching issue keys in commit messages.
    pub issue_pattern: String,
    /// Comment added to each matching issue.
    pub comment: String,
    /// Only issues in this status are updated.
    pub status: String,
    /// Workflow action to invoke after commenting, if any.
    pub action: Option<String>,
    /// Number of builds before the current one whose changes are scanned.
    pub previous_builds: usize,
    /// Report tracker failures as a failed step instead of logging them.
    pub fail_on_error: bool,
}
