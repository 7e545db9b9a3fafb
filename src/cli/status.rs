//! Status command - show mergeability and conflicts of a PR

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, cross, hyperlink};
use anstream::println;
use autopr::error::Result;
use autopr::status::{PrStatus, get_pull_request_conflicts};
use std::path::Path;

/// Run the status command
#[allow(clippy::future_not_send)]
pub async fn run_status(path: &Path, pr_number: u64) -> Result<()> {
    let mut ctx = CommandContext::new(path).await?;

    let details = ctx.platform.get_pr_details(pr_number).await?;
    let status = ctx
        .status
        .get_pull_request_status(ctx.platform.as_ref(), pr_number)
        .await?;
    let readiness = ctx.platform.check_merge_readiness(pr_number).await?;

    println!(
        "{} {}",
        format!("PR #{pr_number}").emphasis(),
        details.title
    );
    println!("  {}", hyperlink(&details.html_url, &details.html_url).muted());
    println!(
        "  {} → {}",
        details.head_ref.accent(),
        details.base_ref.accent()
    );
    let state = if details.is_draft {
        format!("{} (draft)", details.state)
    } else {
        details.state.to_string()
    };
    println!("  State:     {state}");
    println!("  Mergeable: {}", status_label(status));
    println!(
        "  Approved:  {}",
        if readiness.is_approved { check() } else { cross() }
    );
    println!(
        "  CI:        {}",
        if readiness.ci_passed { check() } else { cross() }
    );

    if status == PrStatus::Conflicting {
        let files = get_pull_request_conflicts(ctx.platform.as_ref(), pr_number).await?;
        println!();
        println!("{}", "Conflicting files:".warn());
        for file in &files {
            println!("  - {file}");
        }
        println!(
            "{}",
            format!("Run 'autopr conflicts {pr_number} --local' for line-level detail.").muted()
        );
    } else if status == PrStatus::Checking {
        println!(
            "{}",
            "GitHub is still computing mergeability; try again shortly.".muted()
        );
    }

    Ok(())
}

/// Colored status word
pub fn status_label(status: PrStatus) -> String {
    match status {
        PrStatus::Mergeable => status.success(),
        PrStatus::Conflicting => status.error(),
        PrStatus::Checking => status.accent(),
        PrStatus::Unknown => status.warn(),
    }
}
