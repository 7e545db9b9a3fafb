//! Reviewer-group command - manage named reviewer groups

use crate::cli::context::open_repo;
use crate::cli::split_list;
use crate::cli::style::{Stylize, check};
use anstream::println;
use autopr::config::{
    ConfigUpdate, ReviewerGroup, RotationStrategy, load_project_config, update_config,
};
use autopr::error::{Error, Result};
use clap::Subcommand;
use std::path::Path;

/// Reviewer-group subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum ReviewerGroupAction {
    /// Add a reviewer group
    Add {
        /// Group name
        name: String,
        /// Comma-separated member logins
        #[arg(long, value_name = "LOGINS")]
        members: String,
        /// Rotation strategy
        #[arg(long, value_enum, default_value_t)]
        strategy: RotationStrategy,
    },
    /// Remove a reviewer group
    Remove {
        /// Group name
        name: String,
    },
    /// Change members and/or strategy of a group
    Update {
        /// Group name
        name: String,
        /// Comma-separated member logins (replaces the current list)
        #[arg(long, value_name = "LOGINS")]
        members: Option<String>,
        /// Rotation strategy
        #[arg(long, value_enum)]
        strategy: Option<RotationStrategy>,
    },
    /// List reviewer groups
    List,
}

/// Run a reviewer-group subcommand
pub async fn run_reviewer_group(path: &Path, action: ReviewerGroupAction) -> Result<()> {
    let (_, paths) = open_repo(path).await?;
    let mut project = load_project_config(&paths)?;

    match action {
        ReviewerGroupAction::List => {
            if project.reviewer_groups.is_empty() {
                println!("{}", "No reviewer groups configured".muted());
            }
            for group in &project.reviewer_groups {
                print_group(group);
            }
            return Ok(());
        }
        ReviewerGroupAction::Add {
            name,
            members,
            strategy,
        } => {
            project.add_reviewer_group(ReviewerGroup {
                name: name.clone(),
                members: split_list(&members),
                rotation_strategy: strategy,
            })?;
            println!("{} Added reviewer group {}", check(), name.accent());
        }
        ReviewerGroupAction::Remove { name } => {
            if project.remove_reviewer_group(&name).is_none() {
                return Err(Error::Config(format!("no reviewer group named '{name}'")));
            }
            println!("{} Removed reviewer group {}", check(), name.accent());
            let referencing: Vec<&str> = project
                .branch_patterns
                .iter()
                .filter(|p| p.reviewer_groups.contains(&name))
                .map(|p| p.pattern.as_str())
                .collect();
            if !referencing.is_empty() {
                println!(
                    "{}",
                    format!(
                        "⚠️  Still referenced by: {} (skipped when selecting reviewers)",
                        referencing.join(", ")
                    )
                    .warn()
                );
            }
        }
        ReviewerGroupAction::Update {
            name,
            members,
            strategy,
        } => {
            if members.is_none() && strategy.is_none() {
                return Err(Error::Config(
                    "nothing to update; pass --members and/or --strategy".to_string(),
                ));
            }
            let members = members.as_deref().map(split_list);
            let Some(group) = project.update_reviewer_group(&name, members, strategy)? else {
                return Err(Error::Config(format!("no reviewer group named '{name}'")));
            };
            println!("{} Updated reviewer group", check());
            print_group(group);
        }
    }

    let update = ConfigUpdate {
        reviewer_groups: Some(project.reviewer_groups),
        ..ConfigUpdate::default()
    };
    update_config(&paths, &update)?;
    Ok(())
}

fn print_group(group: &ReviewerGroup) {
    println!(
        "  {} {} {}",
        group.name.emphasis(),
        format!("[{}]", group.rotation_strategy).muted(),
        group.members.join(", ").accent()
    );
}
