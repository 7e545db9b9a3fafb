//! Review command - AI review of a PR's changes

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, spinner_style};
use anstream::println;
use autopr::error::{Error, Result};
use autopr::types::ChangedFile;
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

/// Run the review command
#[allow(clippy::future_not_send)]
pub async fn run_review(path: &Path, pr_number: u64, post: bool) -> Result<()> {
    let ctx = CommandContext::new(path).await?;
    let ai = ctx.ai_client()?;

    let details = ctx.platform.get_pr_details(pr_number).await?;
    let files = ctx.platform.list_pr_files(pr_number).await?;
    let diff = combined_diff(&files);
    if diff.is_empty() {
        return Err(Error::Platform(format!(
            "PR #{pr_number} has no textual changes to review"
        )));
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!(
        "Reviewing {} file(s) of PR #{}...",
        files.len(),
        pr_number
    ));
    spinner.enable_steady_tick(Duration::from_millis(80));
    let review = ai
        .review_code(&details.title, &diff, ctx.config.language())
        .await;
    spinner.finish_and_clear();
    let review = review?;

    println!("{}", format!("Review of PR #{pr_number}").emphasis());
    println!();
    println!("{review}");

    if post {
        ctx.platform.create_pr_comment(pr_number, &review).await?;
        println!();
        println!("{} Posted review as a PR comment", check());
    }
    Ok(())
}

/// Per-file patches joined with `diff --git` style headers
///
/// Files without a patch (binary, too large) are listed by name only.
pub fn combined_diff(files: &[ChangedFile]) -> String {
    let mut diff = String::new();
    for file in files {
        match &file.patch {
            Some(patch) => {
                diff.push_str(&format!(
                    "diff --git a/{0} b/{0}\n{patch}\n",
                    file.filename
                ));
            }
            None => diff.push_str(&format!("# {} (no textual diff)\n", file.filename)),
        }
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopr::types::FileStatus;

    fn file(name: &str, patch: Option<&str>) -> ChangedFile {
        ChangedFile {
            filename: name.to_string(),
            status: FileStatus::Modified,
            additions: 1,
            deletions: 0,
            patch: patch.map(ToString::to_string),
        }
    }

    #[test]
    fn test_combined_diff() {
        let diff = combined_diff(&[file("a.rs", Some("@@ -1 +1 @@\n+x")), file("logo.png", None)]);
        insta::assert_snapshot!(diff.trim_end(), @r"
        diff --git a/a.rs b/a.rs
        @@ -1 +1 @@
        +x
        # logo.png (no textual diff)
        ");
    }
}
