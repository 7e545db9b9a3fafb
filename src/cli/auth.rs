//! Auth command - show or store GitHub credentials

use crate::cli::style::{Stylize, check};
use anstream::println;
use autopr::auth::{AuthSource, GitHubAuthConfig, get_github_auth, test_github_auth};
use autopr::config::{ConfigPaths, load_global_config, save_global_config};
use autopr::error::Result;
use clap::Subcommand;
use std::path::Path;

/// Auth subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum AuthAction {
    /// Show where the token comes from and who it belongs to
    Status {
        /// GitHub Enterprise host
        #[arg(long)]
        host: Option<String>,
    },
    /// Verify a token and store it in the global config
    Login {
        /// Personal access token
        #[arg(long)]
        token: String,
        /// GitHub Enterprise host
        #[arg(long)]
        host: Option<String>,
    },
}

/// Run an auth subcommand
pub async fn run_auth(path: &Path, action: AuthAction) -> Result<()> {
    // Global settings only; works outside a repository
    let paths = ConfigPaths::for_repo(path)?;
    let mut global = load_global_config(&paths)?;

    match action {
        AuthAction::Status { host } => {
            let auth = get_github_auth(global.github_token.as_deref(), host.as_deref()).await?;
            let login = test_github_auth(&auth).await?;
            println!(
                "{} Authenticated as {} {}",
                check(),
                login.accent(),
                format!("(token from {})", auth.source).muted()
            );
        }
        AuthAction::Login { token, host } => {
            let auth = GitHubAuthConfig {
                token: token.trim().to_string(),
                source: AuthSource::Config,
                host,
            };
            let login = test_github_auth(&auth).await?;
            global.github_token = Some(auth.token);
            save_global_config(&paths, &global)?;
            println!(
                "{} Stored token for {} in {}",
                check(),
                login.accent(),
                paths.global_config().display().muted()
            );
        }
    }
    Ok(())
}
