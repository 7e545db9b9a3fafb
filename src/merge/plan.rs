//! Merge planning - pure functions for creating merge plans
//!
//! No I/O happens here; all data is gathered beforehand.

use crate::status::PrStatus;
use crate::types::{MergeMethod, MergeReadiness, PrState, PullRequestDetails};

/// Gathered PR information for planning
#[derive(Debug, Clone)]
pub struct PrInfo {
    /// Full PR details including title, state and head branch
    pub details: PullRequestDetails,
    /// Resolved mergeability
    pub status: PrStatus,
    /// Files reported as conflicting
    pub conflicts: Vec<String>,
    /// Approval and CI state
    pub readiness: MergeReadiness,
}

/// Confidence level for a merge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeConfidence {
    /// All conditions verified - merge should succeed
    Certain,
    /// Some conditions unknown - merge may fail
    Uncertain(String),
}

/// The single step a merge plan resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStep {
    /// Merge this PR
    Merge {
        /// PR number
        pr_number: u64,
        /// PR title (for display)
        pr_title: String,
        /// Merge method to use
        method: MergeMethod,
        /// Confidence level for this merge
        confidence: MergeConfidence,
        /// Head branch to delete afterwards
        delete_branch: Option<String>,
    },
    /// Do not merge
    Skip {
        /// PR number
        pr_number: u64,
        /// Reasons why this PR cannot be merged
        reasons: Vec<String>,
    },
}

impl std::fmt::Display for MergeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge {
                pr_number,
                pr_title,
                confidence,
                method,
                ..
            } => {
                let prefix = match confidence {
                    MergeConfidence::Certain => "merge",
                    MergeConfidence::Uncertain(_) => "merge (uncertain)",
                };
                write!(f, "{prefix} PR #{pr_number} via {method}: {pr_title}")
            }
            Self::Skip { pr_number, reasons } => {
                write!(f, "skip PR #{pr_number}")?;
                if !reasons.is_empty() {
                    write!(f, ": {}", reasons.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

/// Options for merge planning
#[derive(Debug, Clone, Copy, Default)]
pub struct MergePlanOptions {
    /// Merge method
    pub method: MergeMethod,
    /// Delete the head branch after merging
    pub delete_branch: bool,
    /// Merge even without approval or passing CI
    pub force: bool,
}

/// Merge plan - the functional core output
#[derive(Debug, Clone)]
pub struct MergePlan {
    /// What to do
    pub step: MergeStep,
    /// Conditions overridden by `force`
    pub overridden: Vec<String>,
}

impl MergePlan {
    /// Whether the plan merges
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        matches!(self.step, MergeStep::Merge { .. })
    }
}

/// Create a merge plan (PURE - no I/O, easily testable)
///
/// Closed, merged, draft and conflicting PRs are always blocked. Missing
/// approval or failing CI blocks unless `force` is set. A status of
/// `Checking` or `Unknown` still merges, with uncertain confidence.
#[must_use]
pub fn plan_merge(info: &PrInfo, options: &MergePlanOptions) -> MergePlan {
    let pr_number = info.details.number;
    let mut reasons = Vec::new();
    let mut overridden = Vec::new();

    match info.details.state {
        PrState::Merged => reasons.push("PR is already merged".to_string()),
        PrState::Closed => reasons.push("PR is closed".to_string()),
        PrState::Open => {}
    }

    if info.details.is_draft {
        reasons.push("PR is a draft".to_string());
    }

    if info.status == PrStatus::Conflicting {
        if info.conflicts.is_empty() {
            reasons.push("PR has merge conflicts".to_string());
        } else {
            reasons.push(format!(
                "PR has merge conflicts in: {}",
                info.conflicts.join(", ")
            ));
        }
    }

    let mut soft = Vec::new();
    if !info.readiness.is_approved {
        soft.push("PR is not approved".to_string());
    }
    if !info.readiness.ci_passed {
        soft.push("CI checks have not passed".to_string());
    }
    if options.force {
        overridden = soft;
    } else {
        reasons.extend(soft);
    }

    if !reasons.is_empty() {
        return MergePlan {
            step: MergeStep::Skip { pr_number, reasons },
            overridden,
        };
    }

    let confidence = match info.status {
        PrStatus::Mergeable => MergeConfidence::Certain,
        PrStatus::Checking => {
            MergeConfidence::Uncertain("GitHub is still computing mergeability".to_string())
        }
        PrStatus::Unknown | PrStatus::Conflicting => MergeConfidence::Uncertain(
            "GitHub reports the PR as not mergeable (blocked or unstable)".to_string(),
        ),
    };

    MergePlan {
        step: MergeStep::Merge {
            pr_number,
            pr_title: info.details.title.clone(),
            method: options.method,
            confidence,
            delete_branch: options
                .delete_branch
                .then(|| info.details.head_ref.clone()),
        },
        overridden,
    }
}
