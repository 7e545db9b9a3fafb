//! Commit command - AI-improved commit message for the staged diff

use crate::cli::context::{ai_client, open_repo};
use crate::cli::style::{Stylize, check};
use anstream::println;
use autopr::config::load_global_config;
use autopr::error::{Error, Result};
use std::path::Path;

/// Run the commit command
pub async fn run_commit(path: &Path, message: Option<&str>, apply: bool) -> Result<()> {
    let (repo, paths) = open_repo(path).await?;
    let global = load_global_config(&paths)?;
    let ai = ai_client(&global)?;

    let diff = repo.staged_diff().await?;
    if diff.trim().is_empty() {
        return Err(Error::Git("nothing staged; run 'git add' first".to_string()));
    }

    let improved = ai
        .improve_commit_message(message, &diff, global.language)
        .await?;
    let improved = improved.trim();

    println!("{}", "Suggested commit message:".emphasis());
    println!();
    for line in improved.lines() {
        println!("  {line}");
    }
    println!();

    if apply {
        repo.commit(improved).await?;
        println!("{} Committed", check());
    } else {
        println!("{}", "Run with --apply to commit with this message.".muted());
    }
    Ok(())
}
