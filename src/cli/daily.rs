//! Daily command - the day's commits grouped by author

use crate::cli::context::open_repo;
use crate::cli::style::Stylize;
use anstream::println;
use autopr::error::{Error, Result};
use autopr::report::{DailyReport, build_daily_report, day_bounds};
use chrono::{Local, NaiveDate, Offset};
use std::path::Path;

/// Options for the daily command
#[derive(Debug, Clone, Default)]
pub struct DailyOptions {
    /// Day to report (`YYYY-MM-DD`), today if unset
    pub date: Option<String>,
    /// Author email filter
    pub author: Option<String>,
    /// Include every author
    pub all: bool,
}

/// Run the daily command
pub async fn run_daily(path: &Path, options: DailyOptions) -> Result<()> {
    let (repo, _) = open_repo(path).await?;

    let date = match &options.date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| Error::Config(format!("invalid date '{raw}': {e}")))?,
        None => Local::now().date_naive(),
    };
    let offset = Local::now().offset().fix();
    let (since, until) = day_bounds(date, offset)?;

    let author = if options.all {
        None
    } else if options.author.is_some() {
        options.author.clone()
    } else {
        repo.user_email().await?
    };

    let commits = repo
        .commits_in_range(&since, &until, author.as_deref())
        .await?;
    print_report(&build_daily_report(date, commits));
    Ok(())
}

fn print_report(report: &DailyReport) {
    println!(
        "{} {}",
        format!("Commits on {}", report.date).emphasis(),
        format!("({} total)", report.total_commits()).muted()
    );
    if report.authors.is_empty() {
        println!("  {}", "No commits".muted());
        return;
    }
    for author in &report.authors {
        println!();
        println!(
            "{} {} {}",
            author.name.accent(),
            format!("<{}>", author.email).muted(),
            format!("{} commit(s)", author.commits.len()).emphasis()
        );
        for commit in &author.commits {
            println!(
                "  {} {} {}",
                commit.short_sha().warn(),
                commit.date.format("%H:%M").to_string().muted(),
                commit.subject
            );
        }
    }
}
