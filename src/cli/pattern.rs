//! Pattern command - manage branch patterns

use crate::cli::context::open_repo;
use crate::cli::split_list;
use crate::cli::style::{Stylize, check};
use anstream::println;
use autopr::config::{
    BranchPattern, ConfigUpdate, PrType, load_project_config, update_config,
};
use autopr::error::{Error, Result};
use autopr::pattern::{find_matching_pattern, generate_pr_title};
use clap::Subcommand;
use std::path::Path;

/// Pattern subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum PatternAction {
    /// Append a branch pattern (patterns match in order)
    Add {
        /// Glob matched against branch names, e.g. `feat/*`
        glob: String,
        /// PR type for the title prefix
        #[arg(long = "type", value_enum)]
        pr_type: PrType,
        /// Open PRs as drafts
        #[arg(long)]
        draft: bool,
        /// Comma-separated labels
        #[arg(long, value_name = "LABELS")]
        labels: Option<String>,
        /// Body template name
        #[arg(long)]
        template: Option<String>,
        /// Comma-separated reviewer logins
        #[arg(long, value_name = "LOGINS")]
        reviewers: Option<String>,
        /// Comma-separated reviewer group names
        #[arg(long, value_name = "GROUPS")]
        reviewer_groups: Option<String>,
        /// Also request the project's default reviewers
        #[arg(long)]
        auto_assign: bool,
    },
    /// Remove a branch pattern by its glob
    Remove {
        /// Glob of the pattern to remove
        glob: String,
    },
    /// List branch patterns in match order
    List,
    /// Show which pattern a branch name matches
    Test {
        /// Branch name
        branch: String,
    },
}

/// Run a pattern subcommand
pub async fn run_pattern(path: &Path, action: PatternAction) -> Result<()> {
    let (_, paths) = open_repo(path).await?;
    let mut project = load_project_config(&paths)?;

    match action {
        PatternAction::List => {
            if project.branch_patterns.is_empty() {
                println!("{}", "No branch patterns configured".muted());
            }
            for (i, pattern) in project.branch_patterns.iter().enumerate() {
                print_pattern(i + 1, pattern);
            }
            return Ok(());
        }
        PatternAction::Test { branch } => {
            match find_matching_pattern(&project.branch_patterns, &branch) {
                Some(pattern) => {
                    println!(
                        "{} {} matches {}",
                        check(),
                        branch.accent(),
                        pattern.pattern.emphasis()
                    );
                    println!("  Title: {}", generate_pr_title(&branch, pattern));
                }
                None => println!("{}", format!("No pattern matches '{branch}'").muted()),
            }
            return Ok(());
        }
        PatternAction::Add {
            glob,
            pr_type,
            draft,
            labels,
            template,
            reviewers,
            reviewer_groups,
            auto_assign,
        } => {
            let mut pattern = BranchPattern::new(glob.clone(), pr_type);
            pattern.draft = draft;
            pattern.labels = labels.as_deref().map(split_list).unwrap_or_default();
            pattern.template = template;
            pattern.reviewers = reviewers.as_deref().map(split_list).unwrap_or_default();
            pattern.reviewer_groups = reviewer_groups
                .as_deref()
                .map(split_list)
                .unwrap_or_default();
            pattern.auto_assign_reviewers = auto_assign;

            for group in &pattern.reviewer_groups {
                if project.find_reviewer_group(group).is_none() {
                    println!(
                        "{}",
                        format!("⚠️  Reviewer group '{group}' is not defined yet").warn()
                    );
                }
            }

            project.add_branch_pattern(pattern)?;
            println!("{} Added pattern {}", check(), glob.accent());
        }
        PatternAction::Remove { glob } => {
            if project.remove_branch_pattern(&glob).is_none() {
                return Err(Error::Config(format!("no branch pattern '{glob}'")));
            }
            println!("{} Removed pattern {}", check(), glob.accent());
        }
    }

    let update = ConfigUpdate {
        branch_patterns: Some(project.branch_patterns),
        ..ConfigUpdate::default()
    };
    update_config(&paths, &update)?;
    Ok(())
}

fn print_pattern(position: usize, pattern: &BranchPattern) {
    let mut flags = Vec::new();
    if pattern.draft {
        flags.push("draft".to_string());
    }
    if !pattern.labels.is_empty() {
        flags.push(format!("labels: {}", pattern.labels.join(",")));
    }
    if let Some(template) = &pattern.template {
        flags.push(format!("template: {template}"));
    }
    if !pattern.reviewers.is_empty() {
        flags.push(format!("reviewers: {}", pattern.reviewers.join(",")));
    }
    if !pattern.reviewer_groups.is_empty() {
        flags.push(format!("groups: {}", pattern.reviewer_groups.join(",")));
    }
    if pattern.auto_assign_reviewers {
        flags.push("auto-assign".to_string());
    }

    println!(
        "  {}. {} {} {}",
        position,
        format!("{:<16}", pattern.pattern).accent(),
        pattern.pr_type.emphasis(),
        flags.join("  ").muted()
    );
}
