//! Core types for autopr

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pull request as returned by create/update/find operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
    /// Description as currently on GitHub
    pub body: Option<String>,
    /// GraphQL node ID (used for draft mutations)
    pub node_id: Option<String>,
    /// Whether PR is a draft
    pub is_draft: bool,
}

/// Repository coordinates of the remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}

impl PlatformConfig {
    /// `owner/repo` slug, used as cache key prefix
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// Extended PR details, including remote mergeability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestDetails {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR body
    pub body: Option<String>,
    /// Current state of the PR
    pub state: PrState,
    /// Whether PR is a draft
    pub is_draft: bool,
    /// Remote mergeability; `None` while GitHub is still computing it
    pub mergeable: Option<bool>,
    /// Remote merge state (`clean`, `dirty`, `blocked`, `unstable`, ...)
    pub mergeable_state: Option<String>,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// Login of the PR author
    pub author: Option<String>,
    /// Web URL for the PR
    pub html_url: String,
}

impl PullRequestDetails {
    /// Whether the remote reports a conflicting ("dirty") merge state
    pub fn is_dirty(&self) -> bool {
        self.mergeable_state
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("dirty"))
    }
}

/// Status of a file changed by a PR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// New file
    Added,
    /// Modified file
    Modified,
    /// Deleted file
    Removed,
    /// Renamed file
    Renamed,
    /// Copied file
    Copied,
    /// Mode or type change
    Changed,
    /// Listed but unchanged
    Unchanged,
}

/// A file changed by a PR
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path relative to the repository root
    pub filename: String,
    /// Change kind
    pub status: FileStatus,
    /// Lines added
    pub additions: u64,
    /// Lines removed
    pub deletions: u64,
    /// Unified diff hunk, absent for binary or very large files
    pub patch: Option<String>,
}

/// An open PR with the users whose review it is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPullRequest {
    /// PR number
    pub number: u64,
    /// Logins of requested reviewers
    pub requested_reviewers: Vec<String>,
}

/// Merge readiness check result
#[derive(Debug, Clone)]
pub struct MergeReadiness {
    /// Whether the PR has at least one approving review
    pub is_approved: bool,
    /// Whether CI checks have passed (or none are configured)
    pub ci_passed: bool,
}

/// Result of a merge operation
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MergeMethod {
    /// Squash all commits into one
    #[default]
    Squash,
    /// Create a merge commit
    Merge,
    /// Rebase commits onto base branch
    Rebase,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// A repository collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collaborator {
    /// GitHub login
    pub login: String,
    /// Highest permission (`admin`, `maintain`, `write`, `triage`, `read`)
    pub permission: Option<String>,
}

/// A pending repository invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    /// Invitation ID
    pub id: u64,
    /// Invited user login
    pub invitee: Option<String>,
    /// Permission granted on acceptance
    pub permissions: String,
    /// When the invitation was sent
    pub created_at: DateTime<Utc>,
}

/// Collaborator permission levels accepted by GitHub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Permission {
    /// Read-only
    Pull,
    /// Triage issues and PRs
    Triage,
    /// Read/write
    #[default]
    Push,
    /// Manage without admin
    Maintain,
    /// Full admin
    Admin,
}

impl Permission {
    /// API string for the permission
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Triage => "triage",
            Self::Push => "push",
            Self::Maintain => "maintain",
            Self::Admin => "admin",
        }
    }
}

/// Outcome of adding a collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddCollaboratorOutcome {
    /// An invitation was created
    Invited(u64),
    /// The user already had access; permission updated
    AlreadyCollaborator,
}
