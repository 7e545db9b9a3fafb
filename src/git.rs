//! Thin wrapper over the `git` CLI
//!
//! Every call runs `git` as a subprocess in the repository root and turns a
//! non-zero exit into [`Error::Git`] carrying stderr.

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Field separator for `git log` records
const FIELD_SEP: char = '\u{1f}';

/// A commit as listed by [`GitRepo::commits_in_range`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full SHA
    pub sha: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author date
    pub date: DateTime<FixedOffset>,
    /// First line of the message
    pub subject: String,
}

impl CommitInfo {
    /// Abbreviated SHA
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

/// A local git repository
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Find the repository containing `path`
    pub async fn discover(path: &Path) -> Result<Self> {
        let out = run_git(path, &["rev-parse", "--show-toplevel"]).await?;
        Ok(Self {
            root: PathBuf::from(out.trim()),
        })
    }

    /// Repository root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        run_git(&self.root, args).await
    }

    /// Name of the checked-out branch
    pub async fn current_branch(&self) -> Result<String> {
        let branch = self.git(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        let branch = branch.trim();
        if branch == "HEAD" {
            return Err(Error::Git("HEAD is detached; check out a branch first".to_string()));
        }
        Ok(branch.to_string())
    }

    /// URL of a remote
    pub async fn remote_url(&self, remote: &str) -> Result<String> {
        self.git(&["remote", "get-url", remote])
            .await
            .map(|s| s.trim().to_string())
            .map_err(|_| Error::RemoteNotFound(remote.to_string()))
    }

    /// Default branch of a remote as recorded by `git clone`
    pub async fn remote_default_branch(&self, remote: &str) -> Option<String> {
        let head = format!("refs/remotes/{remote}/HEAD");
        let out = self.git(&["symbolic-ref", "--short", &head]).await.ok()?;
        let prefix = format!("{remote}/");
        out.trim().strip_prefix(&prefix).map(ToString::to_string)
    }

    /// Push a branch, setting upstream
    pub async fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.git(&["push", "--set-upstream", remote, branch])
            .await
            .map(drop)
    }

    /// Fetch a branch from a remote
    pub async fn fetch(&self, remote: &str, branch: &str) -> Result<()> {
        self.git(&["fetch", remote, branch]).await.map(drop)
    }

    /// Subjects of commits in `base..HEAD`, oldest first
    pub async fn commit_subjects(&self, base: &str) -> Result<Vec<String>> {
        let range = format!("{base}..HEAD");
        let out = self
            .git(&["log", "--reverse", "--format=%s", &range])
            .await?;
        Ok(out.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }

    /// `git diff --stat` against the merge base with `base`
    pub async fn diff_stat(&self, base: &str) -> Result<String> {
        let range = format!("{base}...HEAD");
        self.git(&["diff", "--stat", &range]).await
    }

    /// Diff against the merge base with `base`
    pub async fn diff(&self, base: &str) -> Result<String> {
        let range = format!("{base}...HEAD");
        self.git(&["diff", &range]).await
    }

    /// Diff of staged changes
    pub async fn staged_diff(&self) -> Result<String> {
        self.git(&["diff", "--cached"]).await
    }

    /// Commit staged changes with a message
    pub async fn commit(&self, message: &str) -> Result<()> {
        self.git(&["commit", "-m", message]).await.map(drop)
    }

    /// Whether tracked files have uncommitted changes
    pub async fn has_uncommitted_changes(&self) -> Result<bool> {
        let out = self
            .git(&["status", "--porcelain", "--untracked-files=no"])
            .await?;
        Ok(!out.trim().is_empty())
    }

    /// Whether a merge is stopped waiting for resolution or commit
    pub async fn merge_in_progress(&self) -> Result<bool> {
        let output = Command::new("git")
            .args(["rev-parse", "-q", "--verify", "MERGE_HEAD"])
            .current_dir(&self.root)
            .output()
            .await
            .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;
        Ok(output.status.success())
    }

    /// Try merging `branch` without committing; `false` when it conflicts.
    ///
    /// Refuses to start on a dirty worktree. A merge git declines to start
    /// (unknown ref, files it would overwrite) is an error, not a conflict.
    pub async fn merge_no_commit(&self, branch: &str) -> Result<bool> {
        if self.has_uncommitted_changes().await? {
            return Err(Error::Git(
                "working tree has uncommitted changes; commit or stash them first".to_string(),
            ));
        }

        let output = Command::new("git")
            .args(["merge", "--no-commit", "--no-ff", branch])
            .current_dir(&self.root)
            .output()
            .await
            .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;
        if output.status.success() {
            return Ok(true);
        }

        if self.merge_in_progress().await? {
            debug!(branch, "merge stopped on conflicts");
            return Ok(false);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(Error::Git(format!(
            "git merge {branch} did not start: {}",
            stderr.trim()
        )))
    }

    /// Abort an in-progress merge
    pub async fn merge_abort(&self) -> Result<()> {
        self.git(&["merge", "--abort"]).await.map(drop)
    }

    /// Paths with unresolved conflicts
    pub async fn conflicted_files(&self) -> Result<Vec<String>> {
        let out = self
            .git(&["diff", "--name-only", "--diff-filter=U"])
            .await?;
        Ok(out.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }

    /// Read a file relative to the repository root
    pub async fn read_file(&self, relative: &str) -> Result<String> {
        Ok(tokio::fs::read_to_string(self.root.join(relative)).await?)
    }

    /// Configured `user.email`
    pub async fn user_email(&self) -> Result<Option<String>> {
        match self.git(&["config", "user.email"]).await {
            Ok(email) => Ok(Some(email.trim().to_string()).filter(|e| !e.is_empty())),
            // git config exits 1 when the key is unset
            Err(Error::Git(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Commits on all branches authored within `[since, until)`
    pub async fn commits_in_range(
        &self,
        since: &DateTime<FixedOffset>,
        until: &DateTime<FixedOffset>,
        author: Option<&str>,
    ) -> Result<Vec<CommitInfo>> {
        let since_arg = format!("--since={}", since.to_rfc3339());
        let until_arg = format!("--until={}", until.to_rfc3339());
        let format_arg = format!("--format=%H{FIELD_SEP}%an{FIELD_SEP}%ae{FIELD_SEP}%aI{FIELD_SEP}%s");
        let author_arg = author.map(|a| format!("--author={a}"));
        let mut args = vec![
            "log",
            "--all",
            "--no-merges",
            since_arg.as_str(),
            until_arg.as_str(),
            format_arg.as_str(),
        ];
        if let Some(author_arg) = &author_arg {
            args.push(author_arg.as_str());
        }
        let out = self.git(&args).await?;
        Ok(parse_log(&out)
            .into_iter()
            .filter(|c| c.date >= *since && c.date < *until)
            .collect())
    }
}

async fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    debug!(?args, "running git");
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Git(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or_default(),
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `git log` output written with the unit-separator format
///
/// Malformed lines are skipped.
pub fn parse_log(output: &str) -> Vec<CommitInfo> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(5, FIELD_SEP);
            let sha = fields.next()?.to_string();
            let author_name = fields.next()?.to_string();
            let author_email = fields.next()?.to_string();
            let date = DateTime::parse_from_rfc3339(fields.next()?).ok()?;
            let subject = fields.next()?.to_string();
            Some(CommitInfo {
                sha,
                author_name,
                author_email,
                date,
                subject,
            })
        })
        .collect()
}
