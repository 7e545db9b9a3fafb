//! Submission execution - effectful operations

use crate::error::Result;
use crate::platform::{PlatformService, PrUpdate};
use crate::progress::ProgressCallback;
use crate::status::StatusResolver;
use crate::submit::plan::PrPlan;
use crate::types::PullRequest;
use tracing::warn;

/// Result of submission execution
#[derive(Debug, Clone)]
pub struct PrExecutionResult {
    /// The PR after all changes
    pub pr: PullRequest,
    /// Whether the PR was newly created
    pub created: bool,
    /// Labels that were applied
    pub labels: Vec<String>,
    /// Reviewers that were requested
    pub reviewers: Vec<String>,
    /// Non-fatal failures (labels, reviewers)
    pub warnings: Vec<String>,
}

/// Execute a submission plan (EFFECTFUL)
///
/// Creates the PR, or updates the existing open PR for the head branch
/// (base, title, draft state). An existing description is kept unless it is
/// empty or the plan asks to replace it. Creation and update failures
/// propagate; label and reviewer failures are collected as warnings.
pub async fn execute_pr_plan(
    plan: &PrPlan,
    reviewers: &[String],
    platform: &dyn PlatformService,
    status: &mut StatusResolver,
    progress: &dyn ProgressCallback,
) -> Result<PrExecutionResult> {
    let (pr, created) = match platform.find_existing_pr(&plan.head).await? {
        Some(existing) => {
            let pr = update_existing(plan, existing, platform, status).await?;
            progress.on_pr_updated(&pr).await;
            (pr, false)
        }
        None => {
            let pr = platform
                .create_pr_with_options(
                    &plan.head,
                    &plan.base,
                    &plan.title,
                    Some(&plan.body),
                    plan.draft,
                )
                .await?;
            progress.on_pr_created(&pr).await;
            (pr, true)
        }
    };

    let mut result = PrExecutionResult {
        pr,
        created,
        labels: Vec::new(),
        reviewers: Vec::new(),
        warnings: Vec::new(),
    };

    if !plan.labels.is_empty() {
        match platform.add_labels(result.pr.number, &plan.labels).await {
            Ok(()) => result.labels.clone_from(&plan.labels),
            Err(e) => {
                warn!(pr = result.pr.number, error = %e, "failed to add labels");
                progress.on_warning("Failed to add labels", &e).await;
                result.warnings.push(format!("labels: {e}"));
            }
        }
    }

    if !reviewers.is_empty() {
        match platform.request_reviewers(result.pr.number, reviewers).await {
            Ok(()) => result.reviewers = reviewers.to_vec(),
            Err(e) => {
                warn!(pr = result.pr.number, error = %e, "failed to request reviewers");
                progress.on_warning("Failed to request reviewers", &e).await;
                result.warnings.push(format!("reviewers: {e}"));
            }
        }
    }

    Ok(result)
}

async fn update_existing(
    plan: &PrPlan,
    existing: PullRequest,
    platform: &dyn PlatformService,
    status: &mut StatusResolver,
) -> Result<PullRequest> {
    let number = existing.number;
    let was_draft = existing.is_draft;
    let body_missing = existing
        .body
        .as_deref()
        .is_none_or(|b| b.trim().is_empty());
    let update = PrUpdate {
        base: (existing.base_ref != plan.base).then(|| plan.base.clone()),
        title: (existing.title != plan.title).then(|| plan.title.clone()),
        body: (plan.replace_body || body_missing).then(|| plan.body.clone()),
    };

    let mut pr = if update.is_empty() {
        existing
    } else {
        platform.update_pr(number, &update).await?
    };

    if plan.draft != was_draft {
        pr = if plan.draft {
            platform.convert_pr_to_draft(number).await?
        } else {
            platform.publish_pr(number).await?
        };
    }

    status.invalidate(platform, number);
    Ok(pr)
}
