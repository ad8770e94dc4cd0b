//! Recording in-memory tracker for tests.

use async_trait::async_trait;
use issuesync_core::issue::{RemoteComment, RemoteFieldValue, RemoteIssue, WorkflowAction};
use issuesync_core::tracker::IssueTracker;
use issuesync_core::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Authenticate,
    Search { query: String, max_results: usize },
    Comments(String),
    AddComment { key: String, body: String },
    Actions(String),
    Progress { key: String, action_id: String },
}

#[derive(Default)]
struct FakeState {
    statuses: Vec<(String, String)>,
    comments: HashMap<String, Vec<String>>,
    actions: HashMap<String, Vec<WorkflowAction>>,
    calls: Vec<Call>,
    reject_login: bool,
}

#[derive(Default)]
pub struct FakeTracker {
    state: Mutex<FakeState>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(self, key: &str, status: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .statuses
            .push((key.to_string(), status.to_string()));
        self
    }

    pub fn with_comment(self, key: &str, body: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .comments
            .entry(key.to_string())
            .or_default()
            .push(body.to_string());
        self
    }

    pub fn with_action(self, key: &str, id: &str, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .actions
            .entry(key.to_string())
            .or_default()
            .push(WorkflowAction::new(id, name));
        self
    }

    pub fn rejecting_login(self) -> Self {
        self.state.lock().unwrap().reject_login = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn comments_on(&self, key: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .comments
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    pub fn status_of(&self, key: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .statuses
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, s)| s.clone())
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn authenticate(&self, _: Option<&str>, _: Option<&str>) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Authenticate);
        if state.reject_login {
            return Err(Error::Authentication("Invalid username or password.".to_string()));
        }
        Ok("fake-token".to_string())
    }

    async fn search_issues(
        &self,
        _: &str,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<RemoteIssue>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Search {
            query: query.to_string(),
            max_results,
        });

        let re = Regex::new(r#"^id in \(([^)]*)\) and status = "(.*)"$"#).unwrap();
        let caps = re
            .captures(query)
            .ok_or_else(|| Error::RemoteProtocol(format!("unsupported query: {}", query)))?;
        let keys: Vec<&str> = caps[1].split(',').collect();
        let status = caps[2].to_string();

        Ok(state
            .statuses
            .iter()
            .filter(|(k, s)| keys.contains(&k.as_str()) && s.eq_ignore_ascii_case(&status))
            .take(max_results)
            .map(|(k, s)| RemoteIssue {
                key: k.clone(),
                status: Some(s.clone()),
                summary: None,
            })
            .collect())
    }

    async fn comments(&self, _: &str, issue_key: &str) -> Result<Vec<RemoteComment>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Comments(issue_key.to_string()));
        Ok(state
            .comments
            .get(issue_key)
            .map(|c| c.iter().map(RemoteComment::new).collect())
            .unwrap_or_default())
    }

    async fn add_comment(&self, _: &str, issue_key: &str, comment: &RemoteComment) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::AddComment {
            key: issue_key.to_string(),
            body: comment.body.clone(),
        });
        state
            .comments
            .entry(issue_key.to_string())
            .or_default()
            .push(comment.body.clone());
        Ok(())
    }

    async fn available_actions(&self, _: &str, issue_key: &str) -> Result<Vec<WorkflowAction>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Actions(issue_key.to_string()));
        Ok(state.actions.get(issue_key).cloned().unwrap_or_default())
    }

    async fn progress_workflow_action(
        &self,
        _: &str,
        issue_key: &str,
        action_id: &str,
        _: &[RemoteFieldValue],
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Progress {
            key: issue_key.to_string(),
            action_id: action_id.to_string(),
        });
        if let Some(entry) = state.statuses.iter_mut().find(|(k, _)| k == issue_key) {
            entry.1 = "Resolved".to_string();
        }
        Ok(())
    }
}
