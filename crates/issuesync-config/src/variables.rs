//! Variable expansion for step templates.
//!
//! The issue pattern and comment text are expanded against the build
//! environment before a run. Supported forms:
//! - `${NAME}` / `$NAME` - custom variable, then environment variable
//! - `${env.NAME}` - environment variable only
//! - `${build.number}` - Current build number
//! - `${build.id}` - Current build identifier
//! - `${timestamp}` - Unix timestamp
//! - `${date}` - ISO date (YYYY-MM-DD)
//! - `${datetime}` - ISO datetime
//! - `$$` - a literal `$`
//!
//! Unknown variables are left untouched.

use issuesync_core::build::Build;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Variable context containing all available variables for expansion.
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    /// Build-related variables
    pub build: BuildContext,
    /// Environment variables
    pub env: HashMap<String, String>,
    /// Custom variables defined by the caller
    pub custom: HashMap<String, String>,
}

/// Build context for variable expansion.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    pub number: u32,
    pub id: String,
}

// Matches `$$`, `${name}` / `${namespace.name}` and bare `$NAME`
static VAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$\$|\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)?)\}|\$([a-zA-Z_][a-zA-Z0-9_]*)",
    )
    .unwrap()
});

impl VariableContext {
    /// Create a new empty variable context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for a build, seeded with the process environment.
    ///
    /// `BUILD_NUMBER` and `BUILD_ID` are exported the way CI hosts do.
    pub fn for_build(build: &Build) -> Self {
        let mut ctx = Self::new();
        ctx.populate_env();
        ctx.set_build(build);
        ctx
    }

    /// Populate environment variables from the current process environment.
    pub fn populate_env(&mut self) {
        for (key, value) in std::env::vars() {
            self.env.insert(key, value);
        }
    }

    /// Record the build being run.
    pub fn set_build(&mut self, build: &Build) {
        self.build.number = build.number;
        self.build.id = build
            .id
            .clone()
            .unwrap_or_else(|| build.number.to_string());
        self.env
            .insert("BUILD_NUMBER".to_string(), self.build.number.to_string());
        self.env
            .insert("BUILD_ID".to_string(), self.build.id.clone());
    }

    /// Add a custom variable.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.custom.insert(name.to_string(), value.into());
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, var_name: &str) -> Option<String> {
        let parts: Vec<&str> = var_name.split('.').collect();

        match parts.as_slice() {
            ["build", "number"] => Some(self.build.number.to_string()),
            ["build", "id"] => Some(self.build.id.clone()),

            ["env", name] => self.env.get(*name).cloned(),

            ["timestamp"] => Some(chrono::Utc::now().timestamp().to_string()),
            ["date"] => Some(chrono::Utc::now().format("%Y-%m-%d").to_string()),
            ["datetime"] => Some(chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()),

            [name] => self
                .custom
                .get(*name)
                .or_else(|| self.env.get(*name))
                .cloned(),

            _ => None,
        }
    }

    /// Expand all variables in a string.
    pub fn interpolate(&self, input: &str) -> String {
        VAR_REGEX
            .replace_all(input, |caps: &regex::Captures| {
                let name = caps.get(1).or_else(|| caps.get(2));
                match name {
                    Some(name) => self
                        .resolve(name.as_str())
                        .unwrap_or_else(|| caps[0].to_string()),
                    None => "$".to_string(),
                }
            })
            .to_string()
    }

    /// Expand, trim, and treat an empty result as absent.
    pub fn expand_trimmed(&self, input: Option<&str>) -> Option<String> {
        input
            .map(|s| self.interpolate(s))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Builder for creating VariableContext.
pub struct VariableContextBuilder {
    ctx: VariableContext,
}

impl VariableContextBuilder {
    pub fn new() -> Self {
        Self {
            ctx: VariableContext::new(),
        }
    }

    pub fn with_build(mut self, build: &Build) -> Self {
        self.ctx.set_build(build);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ctx.env.insert(key.into(), value.into());
        self
    }

    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ctx.custom.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> VariableContext {
        self.ctx
    }
}

impl Default for VariableContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
