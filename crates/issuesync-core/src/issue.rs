//! Issue keys and records returned by the remote tracker.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Unique issue keys in the order they were first seen.
///
/// Keys are compared exactly, so `PROJ-1` and `proj-1` are distinct entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueKeySet {
    keys: Vec<String>,
    seen: HashSet<String>,
}

impl IssueKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, returning `false` if it was already present.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.seen.contains(&key) {
            return false;
        }
        self.seen.insert(key.clone());
        self.keys.push(key);
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keys
    }

    /// Comma-joined keys, as used in log lines and queries.
    pub fn joined(&self) -> String {
        self.keys.join(",")
    }
}

impl<S: Into<String>> FromIterator<S> for IssueKeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for key in iter {
            set.insert(key);
        }
        set
    }
}

/// An issue as reported by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIssue {
    pub key: String,
    /// Status identifier or name, depending on what the tracker sends.
    pub status: Option<String>,
    pub summary: Option<String>,
}

impl RemoteIssue {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: None,
            summary: None,
        }
    }
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteComment {
    pub body: String,
    pub author: Option<String>,
}

impl RemoteComment {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            author: None,
        }
    }

    /// Case-insensitive comparison of the comment body.
    pub fn matches(&self, text: &str) -> bool {
        self.body.to_lowercase() == text.to_lowercase()
    }
}

/// A workflow transition available on an issue in its current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowAction {
    pub id: String,
    pub name: String,
}

impl WorkflowAction {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// A field change sent along with a workflow transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFieldValue {
    pub id: String,
    pub values: Vec<String>,
}
