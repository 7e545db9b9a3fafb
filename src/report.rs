//! Daily commit report

use crate::error::{Error, Result};
use crate::git::CommitInfo;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone};
use std::collections::BTreeMap;

/// Commits of one author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorSummary {
    /// Display name (from the most recent commit)
    pub name: String,
    /// Email the commits are grouped by
    pub email: String,
    /// Commits, newest first
    pub commits: Vec<CommitInfo>,
}

/// Commits of one day grouped by author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyReport {
    /// Reported day
    pub date: NaiveDate,
    /// Authors ordered by commit count, then email
    pub authors: Vec<AuthorSummary>,
}

impl DailyReport {
    /// Total commits across authors
    pub fn total_commits(&self) -> usize {
        self.authors.iter().map(|a| a.commits.len()).sum()
    }
}

/// Start and end (exclusive) of a calendar day in the given offset
pub fn day_bounds(
    date: NaiveDate,
    offset: FixedOffset,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let invalid = || Error::Internal(format!("cannot compute bounds for {date}"));
    let next = date.checked_add_days(Days::new(1)).ok_or_else(invalid)?;
    let start = offset
        .from_local_datetime(&date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?)
        .single()
        .ok_or_else(invalid)?;
    let end = offset
        .from_local_datetime(&next.and_hms_opt(0, 0, 0).ok_or_else(invalid)?)
        .single()
        .ok_or_else(invalid)?;
    Ok((start, end))
}

/// Group commits by author email (case-insensitive)
pub fn build_daily_report(date: NaiveDate, mut commits: Vec<CommitInfo>) -> DailyReport {
    commits.sort_by(|a, b| b.date.cmp(&a.date));

    let mut by_email: BTreeMap<String, AuthorSummary> = BTreeMap::new();
    for commit in commits {
        by_email
            .entry(commit.author_email.to_lowercase())
            .or_insert_with(|| AuthorSummary {
                name: commit.author_name.clone(),
                email: commit.author_email.clone(),
                commits: Vec::new(),
            })
            .commits
            .push(commit);
    }

    let mut authors: Vec<AuthorSummary> = by_email.into_values().collect();
    // Stable sort keeps email order for equal counts
    authors.sort_by(|a, b| b.commits.len().cmp(&a.commits.len()));

    DailyReport { date, authors }
}
