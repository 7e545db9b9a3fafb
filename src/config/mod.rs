//! Global and project configuration
//!
//! The global file holds per-user settings (language, credentials, AI backend);
//! the project file holds the repository's branch policy (patterns, reviewer
//! groups, defaults). Both are typed and reject unknown fields.

mod storage;

pub use storage::{
    ConfigPaths, ConfigUpdate, GLOBAL_CONFIG_FILE, PROJECT_CONFIG_FILE, ROTATION_STATE_FILE,
    TEMPLATES_DIR, load_config, load_global_config, load_project_config, save_global_config,
    save_project_config, update_config, write_json_atomic,
};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Language used for generated PR bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Korean
    Ko,
}

/// PR type bound to a branch pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PrType {
    /// New feature
    Feat,
    /// Bug fix
    Fix,
    /// Refactoring
    Refactor,
    /// Documentation
    Docs,
    /// Maintenance
    Chore,
    /// Tests
    Test,
    /// Release preparation
    Release,
}

impl PrType {
    /// All types in declaration order
    pub const ALL: [Self; 7] = [
        Self::Feat,
        Self::Fix,
        Self::Refactor,
        Self::Docs,
        Self::Chore,
        Self::Test,
        Self::Release,
    ];

    /// Lowercase name as written in config and branch prefixes
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Refactor => "refactor",
            Self::Docs => "docs",
            Self::Chore => "chore",
            Self::Test => "test",
            Self::Release => "release",
        }
    }
}

impl fmt::Display for PrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a reviewer group picks its member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RotationStrategy {
    /// Cycle through members, persisting the last position
    #[default]
    RoundRobin,
    /// Uniformly random member
    Random,
    /// Member with the fewest pending review requests
    LeastBusy,
}

impl fmt::Display for RotationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RoundRobin => "round-robin",
            Self::Random => "random",
            Self::LeastBusy => "least-busy",
        })
    }
}

/// A glob rule mapping a branch naming convention to a PR policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BranchPattern {
    /// Glob matched against the branch name
    pub pattern: String,
    /// PR type used for the title prefix
    #[serde(rename = "type")]
    pub pr_type: PrType,
    /// Open PRs as drafts
    #[serde(default)]
    pub draft: bool,
    /// Labels applied to the PR
    #[serde(default)]
    pub labels: Vec<String>,
    /// Name of a stored body template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Also request the project's default reviewers
    #[serde(default)]
    pub auto_assign_reviewers: bool,
    /// Reviewers requested directly
    #[serde(default)]
    pub reviewers: Vec<String>,
    /// Reviewer groups contributing one member each
    #[serde(default)]
    pub reviewer_groups: Vec<String>,
}

impl BranchPattern {
    /// Pattern with only glob and type set
    pub fn new(pattern: impl Into<String>, pr_type: PrType) -> Self {
        Self {
            pattern: pattern.into(),
            pr_type,
            draft: false,
            labels: Vec::new(),
            template: None,
            auto_assign_reviewers: false,
            reviewers: Vec::new(),
            reviewer_groups: Vec::new(),
        }
    }
}

/// A named set of users with a rotation policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReviewerGroup {
    /// Unique group name
    pub name: String,
    /// Member logins, never empty
    pub members: Vec<String>,
    /// Selection strategy
    #[serde(default)]
    pub rotation_strategy: RotationStrategy,
}

/// AI backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AiConfig {
    /// Base URL of the AI service
    pub endpoint: String,
    /// Bearer key, if the service requires one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Retries after the first attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

/// Per-user configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GlobalConfig {
    /// Language for generated text
    #[serde(default)]
    pub language: Language,
    /// Stored GitHub token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    /// AI backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiConfig>,
}

/// Per-repository configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Base branch for new PRs
    pub default_branch: String,
    /// Integration branch, if the project uses one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development_branch: Option<String>,
    /// Reviewers added when a pattern asks for auto-assignment
    #[serde(default)]
    pub default_reviewers: Vec<String>,
    /// Labels applied to every PR
    #[serde(default)]
    pub default_labels: Vec<String>,
    /// Named reviewer groups
    #[serde(default)]
    pub reviewer_groups: Vec<ReviewerGroup>,
    /// Ordered branch patterns, first match wins
    #[serde(default)]
    pub branch_patterns: Vec<BranchPattern>,
}

impl ProjectConfig {
    /// Empty config for the given base branch
    pub fn new(default_branch: impl Into<String>) -> Self {
        Self {
            default_branch: default_branch.into(),
            development_branch: None,
            default_reviewers: Vec::new(),
            default_labels: Vec::new(),
            reviewer_groups: Vec::new(),
            branch_patterns: Vec::new(),
        }
    }

    /// Config with one `<type>/*` pattern per PR type
    pub fn with_default_patterns(default_branch: impl Into<String>) -> Self {
        let mut config = Self::new(default_branch);
        config.branch_patterns = PrType::ALL
            .iter()
            .map(|t| {
                let mut p = BranchPattern::new(format!("{t}/*"), *t);
                p.labels = vec![t.as_str().to_string()];
                p.draft = *t == PrType::Release;
                p
            })
            .collect();
        config
    }

    /// Look up a reviewer group by name
    pub fn find_reviewer_group(&self, name: &str) -> Option<&ReviewerGroup> {
        self.reviewer_groups.iter().find(|g| g.name == name)
    }

    /// Add a reviewer group; names must be unique
    pub fn add_reviewer_group(&mut self, group: ReviewerGroup) -> Result<()> {
        if self.find_reviewer_group(&group.name).is_some() {
            return Err(Error::Config(format!(
                "reviewer group '{}' already exists",
                group.name
            )));
        }
        validate_group(&group)?;
        self.reviewer_groups.push(group);
        Ok(())
    }

    /// Remove a reviewer group, returning it if it existed
    pub fn remove_reviewer_group(&mut self, name: &str) -> Option<ReviewerGroup> {
        let idx = self.reviewer_groups.iter().position(|g| g.name == name)?;
        Some(self.reviewer_groups.remove(idx))
    }

    /// Replace members and/or strategy of a group
    ///
    /// Returns `Ok(None)` when no group has that name.
    pub fn update_reviewer_group(
        &mut self,
        name: &str,
        members: Option<Vec<String>>,
        strategy: Option<RotationStrategy>,
    ) -> Result<Option<&ReviewerGroup>> {
        let Some(idx) = self.reviewer_groups.iter().position(|g| g.name == name) else {
            return Ok(None);
        };
        let mut updated = self.reviewer_groups[idx].clone();
        if let Some(members) = members {
            updated.members = members;
        }
        if let Some(strategy) = strategy {
            updated.rotation_strategy = strategy;
        }
        validate_group(&updated)?;
        self.reviewer_groups[idx] = updated;
        Ok(Some(&self.reviewer_groups[idx]))
    }

    /// Append a branch pattern; globs must be unique and valid
    pub fn add_branch_pattern(&mut self, pattern: BranchPattern) -> Result<()> {
        if self
            .branch_patterns
            .iter()
            .any(|p| p.pattern == pattern.pattern)
        {
            return Err(Error::Config(format!(
                "branch pattern '{}' already exists",
                pattern.pattern
            )));
        }
        crate::pattern::compile(&pattern.pattern)?;
        self.branch_patterns.push(pattern);
        Ok(())
    }

    /// Remove a branch pattern by its glob
    pub fn remove_branch_pattern(&mut self, glob: &str) -> Option<BranchPattern> {
        let idx = self.branch_patterns.iter().position(|p| p.pattern == glob)?;
        Some(self.branch_patterns.remove(idx))
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.default_branch.trim().is_empty() {
            return Err(Error::Config("defaultBranch must not be empty".to_string()));
        }
        for (i, group) in self.reviewer_groups.iter().enumerate() {
            validate_group(group)?;
            if self.reviewer_groups[..i].iter().any(|g| g.name == group.name) {
                return Err(Error::Config(format!(
                    "duplicate reviewer group '{}'",
                    group.name
                )));
            }
        }
        for pattern in &self.branch_patterns {
            crate::pattern::compile(&pattern.pattern)?;
        }
        Ok(())
    }
}

fn validate_group(group: &ReviewerGroup) -> Result<()> {
    if group.name.trim().is_empty() {
        return Err(Error::Config("reviewer group name must not be empty".to_string()));
    }
    if group.members.iter().all(|m| m.trim().is_empty()) {
        return Err(Error::Config(format!(
            "reviewer group '{}' must have at least one member",
            group.name
        )));
    }
    Ok(())
}

/// Merged view of global and project configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Per-user settings
    pub global: GlobalConfig,
    /// Repository policy
    pub project: ProjectConfig,
}

impl Config {
    /// Active language
    pub const fn language(&self) -> Language {
        self.global.language
    }
}
