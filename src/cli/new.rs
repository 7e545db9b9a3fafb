//! New command - create or update the PR for the current branch

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, spinner_style};
use anstream::{eprintln, println};
use autopr::error::Result;
use autopr::pattern::{DirTemplateStore, find_matching_pattern, generate_pr_body};
use autopr::submit::{PrOverrides, PrPlan, create_pr_plan, execute_pr_plan};
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

/// Options for the new command
#[derive(Debug, Clone, Default)]
pub struct NewOptions {
    /// Explicit base branch
    pub base: Option<String>,
    /// Explicit title
    pub title: Option<String>,
    /// Force a draft PR
    pub draft: bool,
    /// Ask the AI backend for the description
    pub ai: bool,
    /// Skip `git push`
    pub no_push: bool,
    /// Show the plan without touching the remote
    pub dry_run: bool,
}

/// Run the new command
#[allow(clippy::future_not_send)]
pub async fn run_new(path: &Path, options: NewOptions) -> Result<()> {
    // =========================================================================
    // Phase 1: GATHER
    // =========================================================================

    let mut ctx = CommandContext::new(path).await?;
    let branch = ctx.repo.current_branch().await?;

    let pattern = find_matching_pattern(&ctx.config.project.branch_patterns, &branch).cloned();
    match &pattern {
        Some(p) => println!(
            "Branch {} matches {} ({})",
            branch.accent(),
            p.pattern.emphasis(),
            p.pr_type
        ),
        None => println!(
            "{}",
            format!("No branch pattern matches '{branch}'; using defaults").muted()
        ),
    }

    let templates_dir = ctx.paths.templates_dir();
    let templates = DirTemplateStore::new(&templates_dir);
    let mut body = generate_pr_body(pattern.as_ref(), ctx.config.language(), &templates);
    // Only a fresh AI description replaces what an existing PR already says
    let mut ai_described = false;

    if options.ai {
        match describe_with_ai(&ctx, &branch, options.base.as_deref()).await {
            Ok(description) => {
                body = format!("{description}\n\n{body}");
                ai_described = true;
            }
            Err(e) => eprintln!(
                "{} {}",
                "⚠️  AI description skipped:".warn(),
                e.muted()
            ),
        }
    }

    // =========================================================================
    // Phase 2: PLAN
    // =========================================================================

    let overrides = PrOverrides {
        base: options.base.clone(),
        title: options.title.clone(),
        draft: options.draft,
        replace_body: ai_described,
    };
    let plan = create_pr_plan(
        &branch,
        &ctx.config.project,
        pattern.as_ref(),
        &overrides,
        body,
    )?;

    if options.dry_run {
        report_dry_run(&plan, pattern.is_some());
        return Ok(());
    }

    // =========================================================================
    // Phase 3: EXECUTE
    // =========================================================================

    if !options.no_push {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(format!(
            "Pushing {} to {}...",
            branch.accent(),
            ctx.remote_name.emphasis()
        ));
        spinner.enable_steady_tick(Duration::from_millis(80));

        let pushed = ctx.repo.push(&ctx.remote_name, &branch).await;
        match pushed {
            Ok(()) => spinner.finish_with_message(format!(
                "{} Pushed {}",
                check(),
                branch.accent()
            )),
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e);
            }
        }
    }

    // Selection advances round-robin state, so it waits for a successful push
    let reviewers = match &pattern {
        Some(p) => {
            let author = ctx.platform.current_user().await.ok();
            let selection = ctx
                .reviewers
                .select_reviewers(p, &ctx.config.project, ctx.platform.as_ref(), author.as_deref())
                .await;
            for name in &selection.dropped {
                eprintln!(
                    "{} {} is not a collaborator, skipping",
                    "⚠️ ".warn(),
                    name.accent()
                );
            }
            selection.reviewers
        }
        None => Vec::new(),
    };

    let progress = CliProgress::verbose();
    let result = execute_pr_plan(
        &plan,
        &reviewers,
        ctx.platform.as_ref(),
        &mut ctx.status,
        &progress,
    )
    .await?;

    if !result.labels.is_empty() {
        println!("  Labels:    {}", result.labels.join(", ").accent());
    }
    if !result.reviewers.is_empty() {
        println!("  Reviewers: {}", result.reviewers.join(", ").accent());
    }
    if result.pr.is_draft {
        println!("  {}", "Opened as draft".muted());
    }

    Ok(())
}

#[allow(clippy::future_not_send)]
async fn describe_with_ai(ctx: &CommandContext, branch: &str, base: Option<&str>) -> Result<String> {
    let ai = ctx.ai_client()?;
    let base = base.unwrap_or(&ctx.config.project.default_branch);
    let commits = ctx.repo.commit_subjects(base).await?;
    let diff_stat = ctx.repo.diff_stat(base).await?;
    ai.generate_pr_description(branch, &commits, &diff_stat, ctx.config.language())
        .await
}

fn report_dry_run(plan: &PrPlan, matched: bool) {
    println!();
    println!("{}:", "PR plan".emphasis());
    println!("  {} → {}", plan.head.accent(), plan.base.accent());
    println!("  Title:  {}", plan.title);
    println!("  Draft:  {}", if plan.draft { "yes" } else { "no" });
    if !plan.labels.is_empty() {
        println!("  Labels: {}", plan.labels.join(", "));
    }
    if matched {
        println!("  {}", "Reviewers are chosen when the PR is submitted.".muted());
    }
    println!();
    for line in plan.body.lines() {
        println!("  {}", line.muted());
    }
    println!();
    println!("{}", "Run without --dry-run to execute.".muted());
}
