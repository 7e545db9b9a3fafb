//! Error types for autopr

use thiserror::Error;

/// Errors produced by autopr operations
#[derive(Debug, Error)]
pub enum Error {
    /// The repository has no project configuration
    #[error("repository is not configured for autopr: {0}")]
    NotConfigured(String),

    /// Configuration file could not be read, parsed or validated
    #[error("configuration error: {0}")]
    Config(String),

    /// A branch pattern is not a valid glob
    #[error("invalid branch pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Parser message
        message: String,
    },

    /// A git subprocess failed
    #[error("git error: {0}")]
    Git(String),

    /// GitHub API request failed
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Generic platform failure (used by test doubles and wrappers)
    #[error("platform error: {0}")]
    Platform(String),

    /// No usable credentials
    #[error("authentication error: {0}")]
    Auth(String),

    /// AI backend request failed
    #[error("AI backend error: {0}")]
    Ai(String),

    /// Rotation state could not be read or written
    #[error("reviewer rotation state error: {0}")]
    RotationState(String),

    /// Pull request does not exist
    #[error("pull request #{0} not found")]
    PrNotFound(u64),

    /// Named remote is missing
    #[error("remote '{0}' not found")]
    RemoteNotFound(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else
    #[error("{0}")]
    Internal(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } => Self::GitHubApi(source.message.clone()),
            _ => Self::GitHubApi(err.to_string()),
        }
    }
}

/// Result alias for autopr operations
pub type Result<T> = std::result::Result<T, Error>;
