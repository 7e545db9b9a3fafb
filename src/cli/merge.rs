//! Merge command - merge a PR after checking its status

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, cross};
use anstream::println;
use autopr::error::{Error, Result};
use autopr::merge::{
    MergeConfidence, MergeExecutionResult, MergePlan, MergePlanOptions, MergeStep, PrInfo,
    execute_merge, plan_merge,
};
use autopr::status::{PrStatus, conflicts_from_details};
use autopr::types::MergeMethod;
use dialoguer::Confirm;
use std::io::IsTerminal;
use std::path::Path;

/// Options for the merge command
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Merge method
    pub method: MergeMethod,
    /// Delete the head branch after merging
    pub delete_branch: bool,
    /// Merge without approval or passing CI
    pub force: bool,
    /// Dry run - show what would be merged without making changes
    pub dry_run: bool,
    /// Skip the confirmation prompt
    pub yes: bool,
}

/// Run the merge command
#[allow(clippy::future_not_send)]
pub async fn run_merge(path: &Path, pr_number: u64, options: MergeOptions) -> Result<()> {
    // =========================================================================
    // Phase 1: GATHER - Collect all data upfront
    // =========================================================================

    let mut ctx = CommandContext::new(path).await?;
    let info = gather_pr_info(&mut ctx, pr_number).await?;

    // =========================================================================
    // Phase 2: PLAN - Pure function, easily testable
    // =========================================================================

    let plan_options = MergePlanOptions {
        method: options.method,
        delete_branch: options.delete_branch,
        force: options.force,
    };
    let plan = plan_merge(&info, &plan_options);

    // =========================================================================
    // Phase 3: EXECUTE - Effectful operations
    // =========================================================================

    if options.dry_run {
        report_merge_plan(&plan);
        println!();
        if plan.is_actionable() {
            println!("{}", "Run without --dry-run to execute.".muted());
        }
        return Ok(());
    }

    if let MergeStep::Skip { reasons, .. } = &plan.step {
        report_merge_plan(&plan);
        return Err(Error::Platform(format!(
            "PR #{pr_number} cannot be merged: {}",
            reasons.join("; ")
        )));
    }

    if !options.yes {
        report_merge_plan(&plan);
        if !std::io::stdin().is_terminal() {
            return Err(Error::Internal(
                "Refusing to merge without confirmation; pass --yes".to_string(),
            ));
        }
        if !Confirm::new()
            .with_prompt("Proceed with merge?")
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?
        {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
        println!();
    }

    let progress = CliProgress::compact();
    let result = execute_merge(&plan, ctx.platform.as_ref(), &mut ctx.status, &progress).await?;
    print_merge_summary(pr_number, &result)
}

/// Fetch details once and derive status and conflicts from them, then readiness
#[allow(clippy::future_not_send)]
async fn gather_pr_info(ctx: &mut CommandContext, pr_number: u64) -> Result<PrInfo> {
    let fetched = ctx.platform.get_pr_details(pr_number).await?;
    let (status, details) = ctx
        .status
        .resolve_from_details(ctx.platform.as_ref(), fetched)
        .await?;
    let conflicts = if status == PrStatus::Conflicting {
        conflicts_from_details(ctx.platform.as_ref(), &details).await?
    } else {
        Vec::new()
    };
    let readiness = ctx.platform.check_merge_readiness(pr_number).await?;

    Ok(PrInfo {
        details,
        status,
        conflicts,
        readiness,
    })
}

/// Print merge summary; a failed merge becomes the command's error
fn print_merge_summary(pr_number: u64, result: &MergeExecutionResult) -> Result<()> {
    println!();
    if result.is_success() {
        println!("{} Merged PR #{}", check(), pr_number.accent());
        if let Some(sha) = &result.sha {
            println!("   Commit: {}", sha.muted());
        }
        if result.branch_deleted {
            println!("   {}", "Head branch deleted".muted());
        }
        return Ok(());
    }

    let message = result
        .error_message
        .clone()
        .unwrap_or_else(|| "merge was not performed".to_string());
    if result.was_uncertain {
        println!(
            "{} PR #{} not merged (merge status was uncertain)",
            cross(),
            pr_number
        );
    } else {
        println!("{} PR #{} not merged", cross(), pr_number);
    }
    Err(Error::GitHubApi(message))
}

/// Describe the plan
fn report_merge_plan(plan: &MergePlan) {
    println!("{}:", "Merge plan".emphasis());
    match &plan.step {
        MergeStep::Merge {
            pr_number,
            pr_title,
            method,
            confidence,
            delete_branch,
        } => {
            match confidence {
                MergeConfidence::Certain => println!(
                    "  {} PR #{}: {}",
                    "✓ Would merge".success(),
                    pr_number,
                    pr_title
                ),
                MergeConfidence::Uncertain(reason) => {
                    println!(
                        "  {} PR #{}: {}",
                        "? Would attempt".warn(),
                        pr_number,
                        pr_title
                    );
                    println!("    ⚠ {}", reason.muted());
                }
            }
            println!("    Method: {}", method.accent());
            if let Some(branch) = delete_branch {
                println!("    Then delete branch {}", branch.accent());
            }
        }
        MergeStep::Skip { pr_number, reasons } => {
            println!("  {} PR #{}", "✗ Cannot merge".warn(), pr_number);
            for reason in reasons {
                println!("    - {}", reason.muted());
            }
        }
    }
    for overridden in &plan.overridden {
        println!("    {} {}", "forced:".warn(), overridden.muted());
    }
}
