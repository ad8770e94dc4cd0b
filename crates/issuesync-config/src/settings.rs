//! Settings file parsing.
//!
//! ```kdl
//! tracker "https://jira.example.com" {
//!     username "bot"
//!     password-env "JIRA_PASSWORD"
//! }
//! defaults {
//!     issue-pattern "[A-Z]+-\\d+"
//!     comment "Fixed in build ${BUILD_NUMBER}"
//! }
//! step {
//!     status "Open"
//!     action "Resolve"
//!     previous-builds 2
//! }
//! ```

use crate::step::StepSettings;
use crate::{ConfigError, ConfigResult};
use issuesync_core::tracker::TrackerConnection;
use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Everything read from a settings file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub tracker: TrackerSettings,
    pub defaults: Defaults,
    pub step: StepSettings,
}

/// Persisted tracker location and credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSettings {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Environment variable holding the password.
    pub password_env: Option<String>,
}

impl TrackerSettings {
    /// Password from the file, or from `password_env` when set.
    pub fn resolved_password(&self) -> Option<String> {
        match &self.password_env {
            Some(var) => std::env::var(var).ok().or_else(|| self.password.clone()),
            None => self.password.clone(),
        }
    }

    /// Build the immutable connection value used at run time.
    pub fn connection(&self) -> ConfigResult<TrackerConnection> {
        let password = self.resolved_password();
        TrackerConnection::new(&self.url, self.username.as_deref(), password.as_deref()).map_err(
            |e| ConfigError::InvalidValue {
                field: "tracker".to_string(),
                message: e.to_string(),
            },
        )
    }
}

impl std::fmt::Debug for TrackerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerSettings")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("password_env", &self.password_env)
            .finish()
    }
}

/// Global fallbacks for step templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    pub issue_pattern: Option<String>,
    pub comment: Option<String>,
}

/// Read and parse a settings file.
pub fn load_settings(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading settings");
    let content = std::fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Parse settings from KDL text.
pub fn parse_settings(kdl: &str) -> ConfigResult<Settings> {
    let doc: KdlDocument = kdl.parse()?;

    let mut tracker = None;
    let mut defaults = Defaults::default();
    let mut step = StepSettings::default();

    for node in doc.nodes() {
        match node.name().value() {
            "tracker" => {
                if tracker.is_some() {
                    return Err(ConfigError::Duplicate("tracker".to_string()));
                }
                tracker = Some(parse_tracker(node)?);
            }
            "defaults" => {
                defaults = parse_defaults(node);
            }
            "step" => {
                step = parse_step(node)?;
            }
            _ => {} // Ignore unknown nodes
        }
    }

    let tracker = tracker.ok_or_else(|| ConfigError::MissingField("tracker".to_string()))?;

    Ok(Settings {
        tracker,
        defaults,
        step,
    })
}

fn parse_tracker(node: &KdlNode) -> ConfigResult<TrackerSettings> {
    let url = get_first_string_arg(node)
        .or_else(|| get_string_prop(node, "url"))
        .or_else(|| get_child_string(node, "url"))
        .ok_or_else(|| ConfigError::MissingField("tracker url".to_string()))?;

    if url.trim().is_empty() {
        return Err(ConfigError::MissingField("tracker url".to_string()));
    }

    Ok(TrackerSettings {
        url,
        username: get_child_string(node, "username"),
        password: get_child_string(node, "password"),
        password_env: get_child_string(node, "password-env"),
    })
}

fn parse_defaults(node: &KdlNode) -> Defaults {
    Defaults {
        issue_pattern: get_child_string(node, "issue-pattern"),
        comment: get_child_string(node, "comment"),
    }
}

fn parse_step(node: &KdlNode) -> ConfigResult<StepSettings> {
    let previous_builds = match get_child_integer(node, "previous-builds") {
        Some(n) => Some(usize::try_from(n).map_err(|_| ConfigError::InvalidValue {
            field: "previous-builds".to_string(),
            message: format!("expected a non-negative number, got {}", n),
        })?),
        None => None,
    };

    Ok(StepSettings {
        issue_pattern: get_child_string(node, "issue-pattern"),
        comment: get_child_string(node, "comment"),
        status: get_child_string(node, "status"),
        action: get_child_string(node, "action"),
        previous_builds,
        fail_on_error: get_child_bool(node, "fail-on-error"),
    })
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn find_child<'a>(node: &'a KdlNode, name: &str) -> Option<&'a KdlNode> {
    node.children()?
        .nodes()
        .iter()
        .find(|child| child.name().value() == name)
}

fn get_child_string(node: &KdlNode, name: &str) -> Option<String> {
    find_child(node, name).and_then(get_first_string_arg)
}

fn get_child_integer(node: &KdlNode, name: &str) -> Option<i128> {
    find_child(node, name)?
        .entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_integer())
}

fn get_child_bool(node: &KdlNode, name: &str) -> Option<bool> {
    find_child(node, name)?
        .entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_bool())
}
