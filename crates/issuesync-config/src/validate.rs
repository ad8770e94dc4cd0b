//! Validation helpers for user-supplied settings.

use crate::{ConfigError, ConfigResult};
use regex::Regex;

/// Compile an issue-key pattern.
pub fn compile_pattern(pattern: &str) -> ConfigResult<Regex> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Check a pattern typed into configuration. An empty value has not been
/// entered yet and is accepted.
pub fn check_pattern(value: &str) -> ConfigResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    compile_pattern(value).map(|_| ())
}
