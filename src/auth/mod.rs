//! Authentication for GitHub
//!
//! Tokens come from environment variables, the global config file or the
//! `gh` CLI, in that order.

mod github;

pub use github::{GitHubAuthConfig, get_github_auth, test_github_auth};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from the `gh` CLI
    Cli,
    /// Token from environment variable
    EnvVar,
    /// Token stored in the global config file
    Config,
}

impl std::fmt::Display for AuthSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "gh CLI"),
            Self::EnvVar => write!(f, "environment"),
            Self::Config => write!(f, "config file"),
        }
    }
}
