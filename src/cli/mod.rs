//! CLI command implementations

pub mod auth;
pub mod collaborators;
pub mod commit;
pub mod conflicts;
pub mod context;
pub mod daily;
pub mod init;
pub mod merge;
pub mod new;
pub mod pattern;
pub mod review;
pub mod reviewer_group;
pub mod status;
pub mod style;

use anstream::{eprintln, println};
use async_trait::async_trait;
use autopr::error::Error;
use autopr::progress::ProgressCallback;
use autopr::types::PullRequest;
use style::{Stylize, arrow, check, hyperlink};

/// Progress callback printing one line per event
#[derive(Debug, Clone, Copy, Default)]
pub struct CliProgress {
    compact: bool,
}

impl CliProgress {
    /// Progress with PR links printed in full
    pub const fn verbose() -> Self {
        Self { compact: false }
    }

    /// Progress with PR links shortened to the number
    pub const fn compact() -> Self {
        Self { compact: true }
    }

    fn pr_line(&self, verb: &str, pr: &PullRequest) -> String {
        let label = format!("#{}", pr.number);
        if self.compact {
            format!("{} {verb} PR {}", check(), hyperlink(&label, &pr.html_url).accent())
        } else {
            format!(
                "{} {verb} PR {} {}",
                check(),
                label.accent(),
                hyperlink(&pr.html_url, &pr.html_url).muted()
            )
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        println!("{} {message}", arrow());
    }

    async fn on_pr_created(&self, pr: &PullRequest) {
        println!("{}", self.pr_line("Created", pr));
    }

    async fn on_pr_updated(&self, pr: &PullRequest) {
        println!("{}", self.pr_line("Updated", pr));
    }

    async fn on_warning(&self, context: &str, error: &Error) {
        eprintln!("{} {}", format!("⚠️  {context}:").warn(), error.muted());
    }
}

/// Split a comma-separated list, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
