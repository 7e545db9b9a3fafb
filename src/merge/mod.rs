//! Merge engine for a single PR
//!
//! Three-phase pattern matching submit/:
//! 1. Gather - fetch PR details, status, conflicts and readiness (effectful)
//! 2. Plan - create `MergePlan` (pure, testable)
//! 3. Execute - merge, delete the branch, invalidate status (effectful)

mod execute;
mod plan;

pub use execute::{MergeExecutionResult, execute_merge};
pub use plan::{MergeConfidence, MergePlan, MergePlanOptions, MergeStep, PrInfo, plan_merge};
