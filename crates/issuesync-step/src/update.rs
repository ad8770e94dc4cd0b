//! The issue update step.
//!
//! For each run:
//! 1. expand and compile the issue pattern (a bad pattern fails the step)
//! 2. extract keys from the current build and `previous_builds` ancestors
//! 3. open a tracker session and find the issues in the target status
//! 4. comment on each issue that does not carry the comment yet, then invoke
//!    the configured workflow action
//!
//! Tracker errors are written to the build log and swallowed unless
//! `fail_on_error` is set.

use crate::extract::extract_issue_keys;
use crate::step::{BuildStep, IssueOutcome, StepContext, StepOutcome, SyncReport};
use async_trait::async_trait;
use issuesync_config::SyncParameters;
use issuesync_config::validate::compile_pattern;
use issuesync_core::issue::{IssueKeySet, RemoteComment};
use issuesync_core::{Error, Result, RunId};
use tracing::{Instrument, error, info, info_span};

/// Comments on and transitions issues referenced by recent commits.
#[derive(Debug, Clone)]
pub struct IssueUpdateStep {
    params: SyncParameters,
}

impl IssueUpdateStep {
    pub fn new(params: SyncParameters) -> Self {
        Self { params }
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        ctx.log.info("Updating associated JIRA issue(s)...");

        let comment = ctx
            .variables
            .expand_trimmed(Some(self.params.comment.as_str()))
            .ok_or_else(|| Error::Configuration("comment is empty after expansion".to_string()))?;
        let pattern = ctx
            .variables
            .expand_trimmed(Some(self.params.issue_pattern.as_str()))
            .ok_or_else(|| {
                Error::Configuration("issue pattern is empty after expansion".to_string())
            })?;
        let pattern = compile_pattern(&pattern)?;

        let keys = extract_issue_keys(ctx.history, &pattern, self.params.previous_builds);
        if keys.is_empty() {
            ctx.log.info("No issue key extracted.");
            return Ok(StepOutcome::NoIssueKeys);
        }

        ctx.log
            .info(&format!("Extracted issues key(s) -> ({})", keys.joined()));
        info!(keys = %keys.joined(), "Extracted issue keys");

        match self.synchronize(ctx, &keys, &comment).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(error = %e, "Issue update failed");
                ctx.log.error(&e.to_string());
                if self.params.fail_on_error {
                    Err(e)
                } else {
                    Ok(StepOutcome::Failed {
                        message: e.to_string(),
                    })
                }
            }
        }
    }

    async fn synchronize(
        &self,
        ctx: &mut StepContext<'_>,
        keys: &IssueKeySet,
        comment: &str,
    ) -> Result<StepOutcome> {
        let session = ctx.connection.connect(ctx.tracker.clone()).await?;

        let status = &self.params.status;
        let query = search_query(keys, status);
        let issues = session.search_issues(&query, keys.len()).await?;
        if issues.is_empty() {
            ctx.log
                .info(&format!("No Jira issue in \"{}\" status", status));
            return Ok(StepOutcome::NoMatchingIssues {
                keys: keys.as_slice().to_vec(),
            });
        }

        let mut report = SyncReport {
            keys: keys.as_slice().to_vec(),
            issues: Vec::with_capacity(issues.len()),
        };

        for issue in &issues {
            let existing = session.comments(&issue.key).await?;
            if existing.iter().any(|c| c.matches(comment)) {
                info!(issue = %issue.key, "Comment already present, skipping");
                report
                    .issues
                    .push((issue.key.clone(), IssueOutcome::AlreadyCommented));
                continue;
            }

            ctx.log.info(&format!("Comments added -> {}", comment));
            session
                .add_comment(&issue.key, &RemoteComment::new(comment))
                .await?;
            info!(issue = %issue.key, "Comment added");

            let mut outcome = IssueOutcome::Commented;
            if let Some(action_name) = &self.params.action {
                let actions = session.available_actions(&issue.key).await?;
                for action in actions.iter().filter(|a| a.is_named(action_name)) {
                    ctx.log.info(&format!(
                        "Progress issue [{}] -> [{}]",
                        issue.key, action_name
                    ));
                    session
                        .progress_workflow_action(&issue.key, &action.id, &[])
                        .await?;
                    info!(issue = %issue.key, action = %action.name, "Workflow action invoked");
                    outcome = IssueOutcome::Transitioned {
                        action: action.name.clone(),
                    };
                }
            }
            report.issues.push((issue.key.clone(), outcome));
        }

        Ok(StepOutcome::Updated(report))
    }
}

#[async_trait]
impl BuildStep for IssueUpdateStep {
    fn name(&self) -> &'static str {
        "issue-update"
    }

    async fn perform(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let run_id = RunId::new();
        let build = ctx.history.current().map(|b| b.number);
        let span = info_span!("issue_update", run_id = %run_id, build = ?build);
        self.run(ctx).instrument(span).await
    }
}

/// Query selecting the extracted issues that are in `status`.
fn search_query(keys: &IssueKeySet, status: &str) -> String {
    format!(
        "id in ({}) and status = \"{}\"",
        keys.joined(),
        status.replace('"', "\\\"")
    )
}
