//! GitHub token discovery

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

/// Environment variables checked for a token, in order
const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Resolved GitHub credentials
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Personal access or OAuth token
    pub token: String,
    /// Where the token was found
    pub source: AuthSource,
    /// GitHub Enterprise host (None for github.com)
    pub host: Option<String>,
}

fn env_token() -> Option<String> {
    TOKEN_ENV_VARS.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

async fn gh_cli_token(host: Option<&str>) -> Option<String> {
    let mut cmd = Command::new("gh");
    cmd.args(["auth", "token"]);
    if let Some(h) = host {
        cmd.args(["--hostname", h]);
    }

    let output = cmd.output().await.ok()?;
    if !output.status.success() {
        debug!("gh auth token exited with {}", output.status);
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}

/// Find a GitHub token
///
/// Checks `GITHUB_TOKEN`/`GH_TOKEN`, then the token stored in the global
/// config, then `gh auth token`.
pub async fn get_github_auth(
    stored_token: Option<&str>,
    host: Option<&str>,
) -> Result<GitHubAuthConfig> {
    let host_owned = host.map(ToString::to_string);

    if let Some(token) = env_token() {
        debug!("using GitHub token from environment");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
            host: host_owned,
        });
    }

    if let Some(token) = stored_token.map(str::trim).filter(|t| !t.is_empty()) {
        debug!("using GitHub token from config file");
        return Ok(GitHubAuthConfig {
            token: token.to_string(),
            source: AuthSource::Config,
            host: host_owned,
        });
    }

    if let Some(token) = gh_cli_token(host).await {
        debug!("using GitHub token from gh CLI");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
            host: host_owned,
        });
    }

    Err(Error::Auth(
        "No GitHub token found. Set GITHUB_TOKEN, run 'gh auth login', or 'autopr auth login --token <TOKEN>'."
            .to_string(),
    ))
}

/// Verify the token by fetching the authenticated user; returns the login
pub async fn test_github_auth(config: &GitHubAuthConfig) -> Result<String> {
    #[derive(Deserialize)]
    struct User {
        login: String,
    }

    let url = config.host.as_ref().map_or_else(
        || "https://api.github.com/user".to_string(),
        |h| format!("https://{h}/api/v3/user"),
    );

    let response = reqwest::Client::new()
        .get(&url)
        .header("Authorization", format!("Bearer {}", config.token))
        .header("Accept", "application/vnd.github+json")
        .header("X-GitHub-Api-Version", "2022-11-28")
        .header("User-Agent", concat!("autopr/", env!("CARGO_PKG_VERSION")))
        .send()
        .await
        .map_err(|e| Error::Auth(format!("Failed to reach GitHub: {e}")))?;

    if !response.status().is_success() {
        return Err(Error::Auth(format!(
            "GitHub rejected the token ({})",
            response.status()
        )));
    }

    let user: User = response
        .json()
        .await
        .map_err(|e| Error::Auth(format!("Invalid user response: {e}")))?;
    Ok(user.login)
}
