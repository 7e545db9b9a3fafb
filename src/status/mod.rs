//! PR mergeability tracking and conflict surfacing
//!
//! GitHub computes mergeability lazily: the first read after a push often
//! returns `mergeable: null`. The resolver waits once and re-reads before
//! settling, and caches settled results for five minutes.

pub mod conflicts;

use crate::cache::{STATUS_TTL, TtlCache};
use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{FileStatus, PullRequestDetails};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Delay before re-reading a PR whose mergeability is still being computed
pub const MERGEABLE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Mergeability classification of a PR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrStatus {
    /// Remote reports not mergeable without flagging conflicts
    Unknown,
    /// Can be merged
    Mergeable,
    /// Remote merge state is dirty
    Conflicting,
    /// Remote has not computed mergeability yet
    Checking,
}

impl PrStatus {
    /// Classify remote PR details
    pub fn classify(details: &PullRequestDetails) -> Self {
        match details.mergeable {
            None => Self::Checking,
            Some(_) if details.is_dirty() => Self::Conflicting,
            Some(true) => Self::Mergeable,
            Some(false) => Self::Unknown,
        }
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "UNKNOWN",
            Self::Mergeable => "MERGEABLE",
            Self::Conflicting => "CONFLICTING",
            Self::Checking => "CHECKING",
        })
    }
}

/// Resolves and caches PR status per `owner/repo/number`
#[derive(Debug, Clone)]
pub struct StatusResolver {
    cache: TtlCache<PrStatus>,
    retry_delay: Duration,
}

impl Default for StatusResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusResolver {
    /// Resolver with the standard TTL and retry delay
    pub fn new() -> Self {
        Self::with_retry_delay(MERGEABLE_RETRY_DELAY)
    }

    /// Resolver with a custom retry delay
    pub fn with_retry_delay(retry_delay: Duration) -> Self {
        Self {
            cache: TtlCache::new(STATUS_TTL),
            retry_delay,
        }
    }

    fn key(platform: &dyn PlatformService, number: u64) -> String {
        format!("{}/{number}", platform.config().slug())
    }

    /// Status of a PR, from cache when fresh
    ///
    /// `Checking` is returned but not cached, so the next call asks again.
    pub async fn get_pull_request_status(
        &mut self,
        platform: &dyn PlatformService,
        number: u64,
    ) -> Result<PrStatus> {
        let key = Self::key(platform, number);
        if let Some(status) = self.cache.get(&key) {
            debug!(pr = number, %status, "status cache hit");
            return Ok(status);
        }

        let details = platform.get_pr_details(number).await?;
        let (status, _) = self.settle(platform, key, details).await?;
        Ok(status)
    }

    /// Status of a PR whose details the caller already fetched
    ///
    /// `details` stands in for the first read; the PR is re-read only while
    /// mergeability is still computing. Returns the freshest details.
    pub async fn resolve_from_details(
        &mut self,
        platform: &dyn PlatformService,
        details: PullRequestDetails,
    ) -> Result<(PrStatus, PullRequestDetails)> {
        let key = Self::key(platform, details.number);
        if let Some(status) = self.cache.get(&key) {
            debug!(pr = details.number, %status, "status cache hit");
            return Ok((status, details));
        }
        self.settle(platform, key, details).await
    }

    async fn settle(
        &mut self,
        platform: &dyn PlatformService,
        key: String,
        mut details: PullRequestDetails,
    ) -> Result<(PrStatus, PullRequestDetails)> {
        let number = details.number;
        if details.mergeable.is_none() {
            debug!(pr = number, "mergeability still computing, retrying once");
            tokio::time::sleep(self.retry_delay).await;
            details = platform.get_pr_details(number).await?;
        }

        let status = PrStatus::classify(&details);
        debug!(pr = number, %status, "resolved PR status");
        if status != PrStatus::Checking {
            self.cache.insert(key, status);
        }
        Ok((status, details))
    }

    /// Drop the cached status after the PR changed
    pub fn invalidate(&mut self, platform: &dyn PlatformService, number: u64) {
        if self.cache.invalidate(&Self::key(platform, number)) {
            debug!(pr = number, "status cache invalidated");
        }
    }
}

/// Files reported as conflicting for a PR
///
/// With a dirty merge state every changed file that still exists is
/// reported; line-level detail comes from local inspection. Otherwise the
/// list is empty.
pub async fn get_pull_request_conflicts(
    platform: &dyn PlatformService,
    number: u64,
) -> Result<Vec<String>> {
    let details = platform.get_pr_details(number).await?;
    conflicts_from_details(platform, &details).await
}

/// [`get_pull_request_conflicts`] for details already in hand
pub async fn conflicts_from_details(
    platform: &dyn PlatformService,
    details: &PullRequestDetails,
) -> Result<Vec<String>> {
    if !details.is_dirty() {
        return Ok(Vec::new());
    }
    let files = platform.list_pr_files(details.number).await?;
    Ok(files
        .into_iter()
        .filter(|f| f.status != FileStatus::Removed)
        .map(|f| f.filename)
        .collect())
}
