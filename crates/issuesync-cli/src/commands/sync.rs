//! Run the issue update step for one build.

use crate::history;
use anyhow::{Context, Result};
use clap::Args;
use issuesync_config::{StepSettings, SyncParameters, VariableContext, load_settings};
use issuesync_step::{BuildStep, IssueUpdateStep, StepContext, StepOutcome, WriterLog};
use issuesync_tracker::SoapTracker;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// JSON build history, newest build first
    #[arg(long, conflicts_with = "git_range", required_unless_present = "git_range")]
    pub history: Option<PathBuf>,

    /// Git revision range read as the current build's change log
    #[arg(long)]
    pub git_range: Option<String>,

    /// Repository the git range is read from
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Build number used with --git-range
    #[arg(long, env = "BUILD_NUMBER", default_value = "1")]
    pub build_number: u32,

    /// Issue key pattern
    #[arg(long)]
    pub pattern: Option<String>,

    /// Comment added to each issue
    #[arg(long)]
    pub comment: Option<String>,

    /// Status the issues must be in
    #[arg(long)]
    pub status: Option<String>,

    /// Workflow action invoked after commenting
    #[arg(long)]
    pub action: Option<String>,

    /// Number of previous builds to scan
    #[arg(long)]
    pub previous_builds: Option<usize>,

    /// Fail when the tracker reports an error
    #[arg(long)]
    pub fail_on_error: bool,

    /// Print the run outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    fn overrides(&self) -> StepSettings {
        StepSettings {
            issue_pattern: self.pattern.clone(),
            comment: self.comment.clone(),
            status: self.status.clone(),
            action: self.action.clone(),
            previous_builds: self.previous_builds,
            fail_on_error: self.fail_on_error.then_some(true),
        }
    }
}

pub async fn run(config: &Path, args: SyncArgs) -> Result<()> {
    let settings = load_settings(config)
        .with_context(|| format!("Failed to load settings: {}", config.display()))?;
    let params: SyncParameters = settings
        .step
        .clone()
        .merge(args.overrides())
        .resolve(&settings.defaults)?;

    let history = match (&args.history, &args.git_range) {
        (Some(path), _) => history::load_json(path)?,
        (None, Some(range)) => history::from_git(&args.repo, range, args.build_number).await?,
        (None, None) => anyhow::bail!("Either --history or --git-range is required"),
    };
    let current = history.current().context("Build history is empty")?;
    info!(build = current.number, builds = history.builds.len(), "Loaded build history");

    let variables = VariableContext::for_build(current);
    let connection = settings.tracker.connection()?;
    let tracker = Arc::new(SoapTracker::new(&connection)?);
    let mut log = WriterLog::new(std::io::stdout());

    let step = IssueUpdateStep::new(params);
    let mut ctx = StepContext {
        history: &history,
        variables: &variables,
        connection: &connection,
        tracker,
        log: &mut log,
    };
    let outcome = step
        .perform(&mut ctx)
        .await
        .with_context(|| format!("Step {} failed", step.name()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&outcome);
    }
    Ok(())
}

fn print_summary(outcome: &StepOutcome) {
    match outcome {
        StepOutcome::NoIssueKeys => println!("No issues to update"),
        StepOutcome::NoMatchingIssues { keys } => {
            println!("None of {} matched the target status", keys.join(","))
        }
        StepOutcome::Updated(report) => {
            for (key, state) in &report.issues {
                println!("  {} - {:?}", key, state);
            }
        }
        StepOutcome::Failed { message } => println!("Issue update skipped: {}", message),
    }
}
