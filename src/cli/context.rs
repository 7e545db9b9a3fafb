//! Shared command context for CLI commands
//!
//! Extracts common setup code shared by the commands that talk to GitHub.

use autopr::ai::AiClient;
use autopr::auth::get_github_auth;
use autopr::config::{Config, ConfigPaths, GlobalConfig, load_config};
use autopr::error::{Error, Result};
use autopr::git::GitRepo;
use autopr::platform::{GitHubService, PlatformService, parse_repo_info};
use autopr::reviewers::{ReviewerSelector, RotationStore};
use autopr::status::StatusResolver;
use std::path::Path;

/// Remote used for pushing and repository detection
pub const DEFAULT_REMOTE: &str = "origin";

/// Shared context for CLI commands that interact with the platform
///
/// Owns the status and collaborator caches, so they live exactly as long
/// as one command.
pub struct CommandContext {
    /// The local repository
    pub repo: GitRepo,
    /// Config file locations
    pub paths: ConfigPaths,
    /// Loaded global and project config
    pub config: Config,
    /// Platform service (GitHub)
    pub platform: Box<dyn PlatformService>,
    /// Remote the platform was detected from
    pub remote_name: String,
    /// PR status resolver with its cache
    pub status: StatusResolver,
    /// Reviewer selector with rotation state and collaborator cache
    pub reviewers: ReviewerSelector,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// - Open the repository
    /// - Load global and project config (fails when not initialized)
    /// - Detect owner/repo from the remote
    /// - Resolve a token and create the GitHub service
    pub async fn new(path: &Path) -> Result<Self> {
        let (repo, paths) = open_repo(path).await?;
        let config = load_config(&paths)?;

        let remote_name = DEFAULT_REMOTE.to_string();
        let remote_url = repo.remote_url(&remote_name).await?;
        let platform_config = parse_repo_info(&remote_url)?;

        let auth = get_github_auth(
            config.global.github_token.as_deref(),
            platform_config.host.as_deref(),
        )
        .await?;

        let platform = GitHubService::new(
            &auth.token,
            platform_config.owner,
            platform_config.repo,
            platform_config.host,
        )?;

        let reviewers = ReviewerSelector::new(RotationStore::new(paths.rotation_state()));

        Ok(Self {
            repo,
            paths,
            config,
            platform: Box::new(platform),
            remote_name,
            status: StatusResolver::new(),
            reviewers,
        })
    }

    /// AI client from the global config
    pub fn ai_client(&self) -> Result<AiClient> {
        ai_client(&self.config.global)
    }
}

/// Open the repository at `path` and locate its config files
pub async fn open_repo(path: &Path) -> Result<(GitRepo, ConfigPaths)> {
    let repo = GitRepo::discover(path).await?;
    let paths = ConfigPaths::for_repo(repo.root())?;
    Ok((repo, paths))
}

/// AI client, or a config error naming the missing setting
pub fn ai_client(global: &GlobalConfig) -> Result<AiClient> {
    let ai = global.ai.as_ref().ok_or_else(|| {
        Error::Config("AI backend is not configured (set \"ai.endpoint\" in the global config)".to_string())
    })?;
    AiClient::new(ai)
}
