//! Conflicts command - remote file list, local markers, AI suggestions

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::{eprintln, println};
use autopr::ai::AiClient;
use autopr::config::Language;
use autopr::error::{Error, Result};
use autopr::status::conflicts::{ConflictRegion, scan_conflict_markers};
use autopr::status::get_pull_request_conflicts;
use std::path::Path;

/// Options for the conflicts command
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictOptions {
    /// Reproduce the merge locally and scan conflict markers
    pub local: bool,
    /// Ask the AI backend for resolution suggestions
    pub ai: bool,
}

/// Run the conflicts command
#[allow(clippy::future_not_send)]
pub async fn run_conflicts(path: &Path, pr_number: u64, options: ConflictOptions) -> Result<()> {
    let ctx = CommandContext::new(path).await?;
    let ai = if options.ai {
        Some(ctx.ai_client()?)
    } else {
        None
    };

    if options.local {
        return local_conflicts(&ctx, pr_number, ai.as_ref()).await;
    }

    let files = get_pull_request_conflicts(ctx.platform.as_ref(), pr_number).await?;
    if files.is_empty() {
        println!("{} PR #{} has no reported conflicts", check(), pr_number);
        return Ok(());
    }

    println!(
        "{}",
        format!("PR #{pr_number} conflicts in {} file(s):", files.len()).warn()
    );
    for file in &files {
        println!("  - {}", file.accent());
    }

    if let Some(ai) = &ai {
        // Without a local merge only the PR's own patch is available
        let changed = ctx.platform.list_pr_files(pr_number).await?;
        for file in changed.iter().filter(|f| files.contains(&f.filename)) {
            if let Some(patch) = &file.patch {
                suggest(ai, &file.filename, patch, ctx.config.language()).await;
            }
        }
    }
    Ok(())
}

/// Merge the base branch into the checked-out head branch without
/// committing, report conflict regions, then abort the merge
#[allow(clippy::future_not_send)]
async fn local_conflicts(ctx: &CommandContext, pr_number: u64, ai: Option<&AiClient>) -> Result<()> {
    let details = ctx.platform.get_pr_details(pr_number).await?;
    let branch = ctx.repo.current_branch().await?;
    if branch != details.head_ref {
        return Err(Error::Git(format!(
            "check out '{}' to inspect conflicts locally (currently on '{branch}')",
            details.head_ref
        )));
    }

    ctx.repo.fetch(&ctx.remote_name, &details.base_ref).await?;
    let upstream = format!("{}/{}", ctx.remote_name, details.base_ref);

    let clean = ctx.repo.merge_no_commit(&upstream).await?;
    let outcome = if clean {
        Ok(Vec::new())
    } else {
        collect_regions(ctx).await
    };

    // "Already up to date" leaves nothing to abort
    let aborted = match ctx.repo.merge_in_progress().await {
        Ok(true) => ctx.repo.merge_abort().await,
        Ok(false) => Ok(()),
        Err(e) => Err(e),
    };
    let conflicted = outcome?;
    aborted?;
    if conflicted.is_empty() {
        println!(
            "{} {} merges cleanly into {}",
            check(),
            details.head_ref.accent(),
            details.base_ref.accent()
        );
        return Ok(());
    }

    for (file, content, regions) in &conflicted {
        println!();
        println!(
            "{} {}",
            file.emphasis(),
            format!("({} region(s))", regions.len()).muted()
        );
        for region in regions {
            print_region(region);
        }
        if let Some(ai) = ai {
            suggest(ai, file, content, ctx.config.language()).await;
        }
    }
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn collect_regions(ctx: &CommandContext) -> Result<Vec<(String, String, Vec<ConflictRegion>)>> {
    let mut result = Vec::new();
    for file in ctx.repo.conflicted_files().await? {
        let content = ctx.repo.read_file(&file).await?;
        let regions = scan_conflict_markers(&content);
        result.push((file, content, regions));
    }
    Ok(result)
}

fn print_region(region: &ConflictRegion) {
    println!(
        "  {} {}",
        format!("lines {}-{}", region.start_line, region.end_line).accent(),
        format!("{} ↔ {}", region.ours_label, region.theirs_label).muted()
    );
    for line in &region.ours {
        println!("    {} {}", "-".error(), line);
    }
    for line in &region.theirs {
        println!("    {} {}", "+".success(), line);
    }
}

async fn suggest(ai: &AiClient, file: &str, content: &str, language: Language) {
    match ai.suggest_conflict_resolution(file, content, language).await {
        Ok(suggestion) => {
            println!("  {}", "Suggested resolution:".emphasis());
            for line in suggestion.lines() {
                println!("    {line}");
            }
        }
        Err(e) => eprintln!("{} {}", "⚠️  AI suggestion skipped:".warn(), e.muted()),
    }
}
