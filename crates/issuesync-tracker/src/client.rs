//! SOAP implementation of [`IssueTracker`].

use crate::TrackerError;
use crate::envelope::{Param, envelope};
use crate::response;
use async_trait::async_trait;
use issuesync_core::issue::{RemoteComment, RemoteFieldValue, RemoteIssue, WorkflowAction};
use issuesync_core::tracker::{IssueTracker, TrackerConnection};
use issuesync_core::{Error, Result};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Path of the SOAP service under the tracker's base URL.
pub const SERVICE_PATH: &str = "rpc/soap/jirasoapservice-v2";

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tracker client speaking the SOAP API.
pub struct SoapTracker {
    client: reqwest::Client,
    endpoint: Url,
}

impl SoapTracker {
    pub fn new(connection: &TrackerConnection) -> std::result::Result<Self, TrackerError> {
        Self::with_client(connection, http_client(DEFAULT_TIMEOUT)?)
    }

    /// Use a preconfigured HTTP client (proxies, custom timeouts).
    pub fn with_client(
        connection: &TrackerConnection,
        client: reqwest::Client,
    ) -> std::result::Result<Self, TrackerError> {
        let endpoint = connection
            .url()
            .join(SERVICE_PATH)
            .map_err(|e| TrackerError::Request(format!("invalid service URL: {}", e)))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one SOAP call and return the raw response body.
    async fn call(
        &self,
        operation: &str,
        params: &[Param<'_>],
    ) -> std::result::Result<String, TrackerError> {
        debug!(operation, endpoint = %self.endpoint, "SOAP call");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", "\"\"")
            .body(envelope(operation, params))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Faults come back with HTTP 500
        if let Some(fault) = response::fault(&body) {
            return Err(fault);
        }

        if !status.is_success() {
            return Err(TrackerError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

/// HTTP client shared by the SOAP calls and the reachability check.
pub(crate) fn http_client(timeout: Duration) -> std::result::Result<reqwest::Client, TrackerError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("issuesync/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

#[async_trait]
impl IssueTracker for SoapTracker {
    async fn authenticate(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<String> {
        let body = self
            .call(
                "login",
                &[
                    Param::Str(username.unwrap_or_default()),
                    Param::Str(password.unwrap_or_default()),
                ],
            )
            .await
            .map_err(|e| match e {
                TrackerError::Fault { message, .. } => Error::Authentication(message),
                other => other.into(),
            })?;

        Ok(response::parse_login(&body)?)
    }

    async fn search_issues(
        &self,
        token: &str,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<RemoteIssue>> {
        let max_results = i64::try_from(max_results).unwrap_or(i64::from(i32::MAX));
        let body = self
            .call(
                "getIssuesFromJqlSearch",
                &[Param::Str(token), Param::Str(query), Param::Int(max_results)],
            )
            .await?;
        Ok(response::parse_issues(&body))
    }

    async fn comments(&self, token: &str, issue_key: &str) -> Result<Vec<RemoteComment>> {
        let body = self
            .call("getComments", &[Param::Str(token), Param::Str(issue_key)])
            .await?;
        Ok(response::parse_comments(&body))
    }

    async fn add_comment(
        &self,
        token: &str,
        issue_key: &str,
        comment: &RemoteComment,
    ) -> Result<()> {
        self.call(
            "addComment",
            &[
                Param::Str(token),
                Param::Str(issue_key),
                Param::Comment(comment),
            ],
        )
        .await?;
        Ok(())
    }

    async fn available_actions(
        &self,
        token: &str,
        issue_key: &str,
    ) -> Result<Vec<WorkflowAction>> {
        let body = self
            .call(
                "getAvailableActions",
                &[Param::Str(token), Param::Str(issue_key)],
            )
            .await?;
        Ok(response::parse_actions(&body))
    }

    async fn progress_workflow_action(
        &self,
        token: &str,
        issue_key: &str,
        action_id: &str,
        fields: &[RemoteFieldValue],
    ) -> Result<()> {
        self.call(
            "progressWorkflowAction",
            &[
                Param::Str(token),
                Param::Str(issue_key),
                Param::Str(action_id),
                Param::FieldValues(fields),
            ],
        )
        .await?;
        Ok(())
    }
}
