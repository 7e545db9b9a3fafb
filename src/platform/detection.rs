//! Repository detection from git remote URLs

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

// git@host:owner/repo(.git)
static SCP_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[\w.-]+@)?([\w.-]+):([^/][^:]*)$").expect("valid regex")
});

/// Parse owner, repo and host from a GitHub remote URL
///
/// Accepts `https://`, `ssh://` and scp-style (`git@github.com:o/r.git`)
/// remotes. `host` is `None` for github.com, the hostname for GitHub
/// Enterprise.
pub fn parse_repo_info(remote_url: &str) -> Result<PlatformConfig> {
    let remote_url = remote_url.trim();
    let (host, path) = if remote_url.contains("://") {
        let url = Url::parse(remote_url)
            .map_err(|e| Error::Config(format!("invalid remote URL '{remote_url}': {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::Config(format!("remote URL has no host: {remote_url}")))?
            .to_string();
        (host, url.path().to_string())
    } else if let Some(caps) = SCP_LIKE.captures(remote_url) {
        (caps[1].to_string(), caps[2].to_string())
    } else {
        return Err(Error::Config(format!(
            "unrecognized remote URL: {remote_url}"
        )));
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, repo) = path
        .rsplit_once('/')
        .filter(|(o, r)| !o.is_empty() && !r.is_empty() && !o.contains('/'))
        .ok_or_else(|| {
            Error::Config(format!(
                "remote URL does not point at an owner/repo: {remote_url}"
            ))
        })?;

    let host = match host.as_str() {
        "github.com" | "www.github.com" | "ssh.github.com" => None,
        _ => Some(host),
    };

    Ok(PlatformConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host,
    })
}
