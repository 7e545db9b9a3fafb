//! Merge execution - effectful operations

use crate::error::Result;
use crate::merge::plan::{MergeConfidence, MergePlan, MergeStep};
use crate::platform::PlatformService;
use crate::progress::ProgressCallback;
use crate::status::StatusResolver;
use tracing::warn;

/// Result of merge execution
#[derive(Debug, Clone, Default)]
pub struct MergeExecutionResult {
    /// Whether the PR was merged
    pub merged: bool,
    /// Merge commit SHA
    pub sha: Option<String>,
    /// Whether the head branch was deleted
    pub branch_deleted: bool,
    /// Error message from a failed merge (if any)
    pub error_message: Option<String>,
    /// Whether the merge was attempted despite uncertain status
    pub was_uncertain: bool,
}

impl MergeExecutionResult {
    /// Check if the planned merge succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.merged && self.error_message.is_none()
    }
}

/// Execute the merge plan (EFFECTFUL)
///
/// A refused or failed merge is reported in the result rather than as an
/// error. Branch deletion failure after a merge only warns. The PR's cached
/// status is dropped whenever a merge was attempted.
pub async fn execute_merge(
    plan: &MergePlan,
    platform: &dyn PlatformService,
    status: &mut StatusResolver,
    progress: &dyn ProgressCallback,
) -> Result<MergeExecutionResult> {
    let mut result = MergeExecutionResult::default();

    let MergeStep::Merge {
        pr_number,
        pr_title,
        method,
        confidence,
        delete_branch,
    } = &plan.step
    else {
        if let MergeStep::Skip { pr_number, reasons } = &plan.step {
            progress
                .on_message(&format!(
                    "Skipping PR #{pr_number}: {}",
                    reasons.join(", ")
                ))
                .await;
        }
        return Ok(result);
    };

    result.was_uncertain = matches!(confidence, MergeConfidence::Uncertain(_));
    progress
        .on_message(&format!("Merging PR #{pr_number}: {pr_title}"))
        .await;

    let outcome = platform.merge_pr(*pr_number, *method).await;
    status.invalidate(platform, *pr_number);

    match outcome {
        Ok(merge_result) if merge_result.merged => {
            let sha_display = merge_result.sha.as_deref().unwrap_or("(no sha)");
            progress.on_message(&format!("Merged: {sha_display}")).await;
            result.merged = true;
            result.sha = merge_result.sha;
        }
        Ok(merge_result) => {
            // Merge API returned but didn't merge
            result.error_message = merge_result
                .message
                .or_else(|| Some("merge was not performed".to_string()));
            return Ok(result);
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
            return Ok(result);
        }
    }

    if let Some(branch) = delete_branch {
        match platform.delete_branch(branch).await {
            Ok(()) => {
                progress
                    .on_message(&format!("Deleted branch {branch}"))
                    .await;
                result.branch_deleted = true;
            }
            Err(e) => {
                warn!(branch = %branch, error = %e, "failed to delete branch after merge");
                progress.on_warning("Failed to delete branch", &e).await;
            }
        }
    }

    Ok(result)
}
