//! Init command - write a starter project config

use crate::cli::context::{DEFAULT_REMOTE, open_repo};
use crate::cli::style::{Stylize, check};
use anstream::println;
use autopr::config::{PROJECT_CONFIG_FILE, ProjectConfig, save_project_config};
use autopr::error::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Run the init command
pub async fn run_init(path: &Path, default_branch: Option<String>, force: bool) -> Result<()> {
    let (repo, paths) = open_repo(path).await?;
    let config_path = paths.project_config();

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists; use --force to overwrite",
            config_path.display()
        )));
    }

    let default_branch = match default_branch {
        Some(branch) => branch,
        None => repo
            .remote_default_branch(DEFAULT_REMOTE)
            .await
            .unwrap_or_else(|| "main".to_string()),
    };

    let project = ProjectConfig::with_default_patterns(&default_branch);
    save_project_config(&paths, &project)?;
    println!(
        "{} Wrote {} (base branch {})",
        check(),
        PROJECT_CONFIG_FILE.emphasis(),
        default_branch.accent()
    );

    if ensure_gitignored(repo.root(), PROJECT_CONFIG_FILE)? {
        println!("{} Added {} to .gitignore", check(), PROJECT_CONFIG_FILE);
    }

    println!();
    println!("{}", "Branch patterns:".emphasis());
    for pattern in &project.branch_patterns {
        println!(
            "  {} {}",
            format!("{:<12}", pattern.pattern).accent(),
            pattern.pr_type.muted()
        );
    }
    Ok(())
}

/// Append `entry` to `.gitignore` unless already listed; true if written
fn ensure_gitignored(root: &Path, entry: &str) -> Result<bool> {
    let gitignore = root.join(".gitignore");
    let existing = match std::fs::read_to_string(&gitignore) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let bare = entry.trim_start_matches('/');
    if existing
        .lines()
        .map(str::trim)
        .any(|line| line.trim_start_matches('/') == bare)
    {
        debug!(entry, ".gitignore already lists entry");
        return Ok(false);
    }

    let mut content = existing;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(entry);
    content.push('\n');
    std::fs::write(&gitignore, content)?;
    Ok(true)
}
