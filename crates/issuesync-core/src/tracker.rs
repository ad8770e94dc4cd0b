//! Tracker connection settings, sessions and the remote tracker trait.
//!
//! A [`TrackerConnection`] is an immutable value rebuilt from persisted
//! settings. Opening a [`TrackerSession`] authenticates against an
//! [`IssueTracker`] implementation and yields a token that lives for one run.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::issue::{RemoteComment, RemoteFieldValue, RemoteIssue, WorkflowAction};
use crate::{Error, Result};

/// Path under the base URL where issues are browsed.
const BROWSE_PATH: &str = "browse/";

/// Where and how to reach the tracker.
#[derive(Clone, PartialEq, Eq)]
pub struct TrackerConnection {
    url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl TrackerConnection {
    /// Build a connection, normalizing the base URL to end with `/`.
    /// Empty credentials are treated as absent.
    pub fn new(url: &str, username: Option<&str>, password: Option<&str>) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::Configuration("no tracker URL given".to_string()));
        }

        let mut url = Url::parse(url)
            .map_err(|e| Error::Configuration(format!("invalid tracker URL '{}': {}", url, e)))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            url,
            username: fix_empty(username),
            password: fix_empty(password),
        })
    }

    /// Base URL, always ending with `/`.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Resolve a path relative to the base URL.
    pub fn join(&self, path: &str) -> Result<Url> {
        self.url
            .join(path)
            .map_err(|e| Error::Configuration(format!("invalid path '{}': {}", path, e)))
    }

    /// Browser URL of an issue; the key is upper-cased.
    pub fn resolve_issue_url(&self, key: &str) -> Result<Url> {
        self.join(&format!("{}{}", BROWSE_PATH, key.to_uppercase()))
    }

    /// Authenticate against the tracker and open a session for one run.
    pub async fn connect(&self, tracker: Arc<dyn IssueTracker>) -> Result<TrackerSession> {
        TrackerSession::open(tracker, self).await
    }
}

impl fmt::Debug for TrackerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConnection")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn fix_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Operations consumed from the remote tracker.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Log in and return an authentication token.
    async fn authenticate(&self, username: Option<&str>, password: Option<&str>)
    -> Result<String>;

    /// Run a query and return at most `max_results` issues.
    async fn search_issues(
        &self,
        token: &str,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<RemoteIssue>>;

    /// All comments of an issue.
    async fn comments(&self, token: &str, issue_key: &str) -> Result<Vec<RemoteComment>>;

    /// Add a comment to an issue.
    async fn add_comment(&self, token: &str, issue_key: &str, comment: &RemoteComment)
    -> Result<()>;

    /// Workflow actions available on the issue in its current status.
    async fn available_actions(&self, token: &str, issue_key: &str)
    -> Result<Vec<WorkflowAction>>;

    /// Invoke a workflow action.
    async fn progress_workflow_action(
        &self,
        token: &str,
        issue_key: &str,
        action_id: &str,
        fields: &[RemoteFieldValue],
    ) -> Result<()>;
}

/// An authenticated handle to the tracker, valid for one run.
pub struct TrackerSession {
    tracker: Arc<dyn IssueTracker>,
    token: String,
}

impl TrackerSession {
    pub async fn open(tracker: Arc<dyn IssueTracker>, connection: &TrackerConnection) -> Result<Self> {
        let token = tracker
            .authenticate(connection.username(), connection.password())
            .await?;
        Ok(Self { tracker, token })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub async fn search_issues(&self, query: &str, max_results: usize) -> Result<Vec<RemoteIssue>> {
        self.tracker
            .search_issues(&self.token, query, max_results)
            .await
    }

    pub async fn comments(&self, issue_key: &str) -> Result<Vec<RemoteComment>> {
        self.tracker.comments(&self.token, issue_key).await
    }

    pub async fn add_comment(&self, issue_key: &str, comment: &RemoteComment) -> Result<()> {
        self.tracker
            .add_comment(&self.token, issue_key, comment)
            .await
    }

    pub async fn available_actions(&self, issue_key: &str) -> Result<Vec<WorkflowAction>> {
        self.tracker.available_actions(&self.token, issue_key).await
    }

    pub async fn progress_workflow_action(
        &self,
        issue_key: &str,
        action_id: &str,
        fields: &[RemoteFieldValue],
    ) -> Result<()> {
        self.tracker
            .progress_workflow_action(&self.token, issue_key, action_id, fields)
            .await
    }
}

impl fmt::Debug for TrackerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerSession").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_gets_trailing_separator() {
        let conn = TrackerConnection::new("https://jira.example.com/tracker", None, None).unwrap();
        assert_eq!(conn.url().as_str(), "https://jira.example.com/tracker/");

        let conn = TrackerConnection::new("https://jira.example.com/tracker/", None, None).unwrap();
        assert_eq!(conn.url().as_str(), "https://jira.example.com/tracker/");

        let conn = TrackerConnection::new("https://jira.example.com", None, None).unwrap();
        assert_eq!(conn.url().as_str(), "https://jira.example.com/");
    }

    #[test]
    fn test_issue_url_is_upper_cased() {
        let conn = TrackerConnection::new("https://jira.example.com/tracker", None, None).unwrap();
        let url = conn.resolve_issue_url("abc-1").unwrap();
        assert_eq!(url.as_str(), "https://jira.example.com/tracker/browse/ABC-1");
    }

    #[test]
    fn test_empty_credentials_are_absent() {
        let conn =
            TrackerConnection::new("https://jira.example.com", Some(""), Some("")).unwrap();
        assert!(conn.username().is_none());
        assert!(conn.password().is_none());

        let conn =
            TrackerConnection::new("https://jira.example.com", Some("bot"), Some("pw")).unwrap();
        assert_eq!(conn.username(), Some("bot"));
        assert_eq!(conn.password(), Some("pw"));
    }

    #[test]
    fn test_credentials_keep_surrounding_whitespace() {
        let conn =
            TrackerConnection::new("https://jira.example.com", Some("bot"), Some(" pw ")).unwrap();
        assert_eq!(conn.password(), Some(" pw "));

        let conn =
            TrackerConnection::new("https://jira.example.com", Some(" "), Some("   ")).unwrap();
        assert_eq!(conn.username(), Some(" "));
        assert_eq!(conn.password(), Some("   "));
    }

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let err = TrackerConnection::new("", None, None).unwrap_err();
        assert!(err.is_configuration());

        let err = TrackerConnection::new("not a url", None, None).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_debug_redacts_password() {
        let conn =
            TrackerConnection::new("https://jira.example.com", Some("bot"), Some("hunter2"))
                .unwrap();
        let debug = format!("{:?}", conn);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    struct TokenTracker;

    #[async_trait]
    impl IssueTracker for TokenTracker {
        async fn authenticate(
            &self,
            username: Option<&str>,
            password: Option<&str>,
        ) -> Result<String> {
            match (username, password) {
                (Some("bot"), Some("pw")) => Ok("token-1".to_string()),
                _ => Err(Error::Authentication("bad credentials".to_string())),
            }
        }

        async fn search_issues(&self, _: &str, _: &str, _: usize) -> Result<Vec<RemoteIssue>> {
            Ok(vec![])
        }

        async fn comments(&self, _: &str, _: &str) -> Result<Vec<RemoteComment>> {
            Ok(vec![])
        }

        async fn add_comment(&self, _: &str, _: &str, _: &RemoteComment) -> Result<()> {
            Ok(())
        }

        async fn available_actions(&self, _: &str, _: &str) -> Result<Vec<WorkflowAction>> {
            Ok(vec![])
        }

        async fn progress_workflow_action(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: &[RemoteFieldValue],
        ) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_connect_uses_connection_credentials() {
        let conn =
            TrackerConnection::new("https://jira.example.com", Some("bot"), Some("pw")).unwrap();
        let session = conn.connect(Arc::new(TokenTracker)).await.unwrap();
        assert_eq!(session.token(), "token-1");

        let conn =
            TrackerConnection::new("https://jira.example.com", Some("bot"), Some("nope")).unwrap();
        let err = conn.connect(Arc::new(TokenTracker)).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }
}
