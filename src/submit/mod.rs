//! PR submission engine
//!
//! Three-phase pattern shared with merge/:
//! 1. Gather - current branch, matched pattern, reviewers (effectful)
//! 2. Plan - create `PrPlan` (pure, testable)
//! 3. Execute - create or update the PR, then labels and reviewers (effectful)

mod execute;
mod plan;

pub use execute::{PrExecutionResult, execute_pr_plan};
pub use plan::{PrOverrides, PrPlan, create_pr_plan};
