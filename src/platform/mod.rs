//! Remote gateway for GitHub
//!
//! Typed operations over pull requests, branches and collaborators. The
//! policy core only talks to [`PlatformService`], so tests can substitute a
//! hand-written double.

mod detection;
mod github;

pub use detection::parse_repo_info;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{
    AddCollaboratorOutcome, ChangedFile, Collaborator, Invitation, MergeMethod, MergeReadiness,
    MergeResult, OpenPullRequest, Permission, PlatformConfig, PullRequest, PullRequestDetails,
};
use async_trait::async_trait;

/// Fields to change on an existing PR; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrUpdate {
    /// New base branch
    pub base: Option<String>,
    /// New title
    pub title: Option<String>,
    /// New body
    pub body: Option<String>,
}

impl PrUpdate {
    /// Whether nothing would change
    pub const fn is_empty(&self) -> bool {
        self.base.is_none() && self.title.is_none() && self.body.is_none()
    }
}

/// Platform service trait for PR and repository operations
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Find an existing open PR for a head branch
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>>;

    /// Open a PR, optionally as a draft and with a body
    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest>;

    /// Update base, title and/or body of an existing PR
    async fn update_pr(&self, pr_number: u64, update: &PrUpdate) -> Result<PullRequest>;

    /// Publish a draft PR (convert to ready for review)
    async fn publish_pr(&self, pr_number: u64) -> Result<PullRequest>;

    /// Convert a ready PR back to draft
    async fn convert_pr_to_draft(&self, pr_number: u64) -> Result<PullRequest>;

    /// Get full PR details including mergeability
    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails>;

    /// List files changed by a PR
    async fn list_pr_files(&self, pr_number: u64) -> Result<Vec<ChangedFile>>;

    /// List open PRs with their requested reviewers
    async fn list_open_prs(&self) -> Result<Vec<OpenPullRequest>>;

    /// Request reviews from users
    async fn request_reviewers(&self, pr_number: u64, reviewers: &[String]) -> Result<()>;

    /// Add labels to a PR
    async fn add_labels(&self, pr_number: u64, labels: &[String]) -> Result<()>;

    /// Create a comment on a PR
    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()>;

    /// Check approval and CI status
    async fn check_merge_readiness(&self, pr_number: u64) -> Result<MergeReadiness>;

    /// Merge a PR with the specified method
    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult>;

    /// List branch names
    async fn list_branches(&self) -> Result<Vec<String>>;

    /// Delete a branch on the remote
    async fn delete_branch(&self, branch: &str) -> Result<()>;

    /// List repository collaborators
    async fn list_collaborators(&self) -> Result<Vec<Collaborator>>;

    /// Invite a user or update their permission
    async fn add_collaborator(
        &self,
        login: &str,
        permission: Permission,
    ) -> Result<AddCollaboratorOutcome>;

    /// Remove a collaborator
    async fn remove_collaborator(&self, login: &str) -> Result<()>;

    /// List pending invitations
    async fn list_invitations(&self) -> Result<Vec<Invitation>>;

    /// Cancel a pending invitation
    async fn cancel_invitation(&self, invitation_id: u64) -> Result<()>;

    /// Login of the authenticated user
    async fn current_user(&self) -> Result<String>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
