//! KDL configuration parsing for issuesync.
//!
//! This crate handles parsing of:
//! - Tracker connection settings and global defaults (issuesync.kdl)
//! - Issue update step parameters
//! - Variable expansion of step templates
//! - Validation helpers used before a run

pub mod error;
pub mod settings;
pub mod step;
pub mod validate;
pub mod variables;

pub use error::{ConfigError, ConfigResult};
pub use settings::{Defaults, Settings, TrackerSettings, load_settings, parse_settings};
pub use step::{StepSettings, SyncParameters};
pub use variables::{BuildContext, VariableContext, VariableContextBuilder};
