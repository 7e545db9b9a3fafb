//! Progress reporting for long-running operations
//!
//! Engines report through [`ProgressCallback`] so the CLI can render
//! spinners while tests stay silent.

use crate::error::Error;
use crate::types::PullRequest;
use async_trait::async_trait;

/// Receives progress events from submit and merge execution
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Free-form status line
    async fn on_message(&self, message: &str);

    /// A PR was created
    async fn on_pr_created(&self, pr: &PullRequest) {
        self.on_message(&format!("Created PR #{}: {}", pr.number, pr.html_url))
            .await;
    }

    /// An existing PR was updated
    async fn on_pr_updated(&self, pr: &PullRequest) {
        self.on_message(&format!("Updated PR #{}: {}", pr.number, pr.html_url))
            .await;
    }

    /// A non-fatal step failed
    async fn on_warning(&self, context: &str, error: &Error) {
        self.on_message(&format!("{context}: {error}")).await;
    }
}

/// Discards all progress events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}
}
