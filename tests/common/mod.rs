//! Shared fixtures for integration and unit tests

#![allow(dead_code)]

pub mod mock_platform;

pub use mock_platform::{MockPlatformService, changed_file, details};

use autopr::config::{BranchPattern, PrType, ProjectConfig, ReviewerGroup, RotationStrategy};
use autopr::types::{PlatformConfig, PullRequest};
use std::path::Path;
use std::process::Command;

/// GitHub coordinates used by every mock
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "test".to_string(),
        repo: "repo".to_string(),
        host: None,
    }
}

/// An open PR as returned by `find_existing_pr`
pub fn make_pr(number: u64, head: &str, base: &str, title: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/test/repo/pull/{number}"),
        base_ref: base.to_string(),
        head_ref: head.to_string(),
        title: title.to_string(),
        body: None,
        node_id: Some(format!("node-{number}")),
        is_draft: false,
    }
}

/// Reviewer group with the given strategy
pub fn group(name: &str, members: &[&str], strategy: RotationStrategy) -> ReviewerGroup {
    ReviewerGroup {
        name: name.to_string(),
        members: members.iter().map(ToString::to_string).collect(),
        rotation_strategy: strategy,
    }
}

/// Pattern drawing one reviewer from each named group
pub fn pattern_with_groups(glob: &str, pr_type: PrType, groups: &[&str]) -> BranchPattern {
    let mut pattern = BranchPattern::new(glob, pr_type);
    pattern.reviewer_groups = groups.iter().map(ToString::to_string).collect();
    pattern
}

/// Project config holding the given groups
pub fn project_with_groups(groups: Vec<ReviewerGroup>) -> ProjectConfig {
    let mut project = ProjectConfig::new("main");
    project.reviewer_groups = groups;
    project
}

/// Temporary git repository with one commit on `main`
pub struct TempGitRepo {
    pub dir: tempfile::TempDir,
}

impl TempGitRepo {
    pub fn new() -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = Self { dir };
        repo.git(&["init", "--quiet", "--initial-branch=main"]);
        repo.git(&["config", "user.email", "dev@example.com"]);
        repo.git(&["config", "user.name", "Dev"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        std::fs::write(repo.path().join("README.md"), "hello\n").unwrap();
        repo.git(&["add", "README.md"]);
        repo.git(&["commit", "--quiet", "-m", "initial"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }
}
