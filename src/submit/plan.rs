//! Submission planning - pure functions, no I/O

use crate::config::{BranchPattern, ProjectConfig};
use crate::error::{Error, Result};
use crate::pattern::generate_pr_title;

/// Values given on the command line that win over the pattern
#[derive(Debug, Clone, Default)]
pub struct PrOverrides {
    /// Explicit base branch
    pub base: Option<String>,
    /// Explicit title
    pub title: Option<String>,
    /// Force a draft PR
    pub draft: bool,
    /// Overwrite the description of an existing PR
    pub replace_body: bool,
}

/// What the PR for a branch should look like
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrPlan {
    /// Head branch
    pub head: String,
    /// Base branch
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Whether `body` replaces a description an existing PR already has
    pub replace_body: bool,
    /// Open as draft
    pub draft: bool,
    /// Labels to apply, project defaults first
    pub labels: Vec<String>,
}

/// Create a submission plan (PURE - no I/O)
///
/// The base is the explicit override, else the development branch when the
/// project has one (release branches always target the default branch),
/// else the default branch. Without a matched pattern the title is the
/// branch name.
pub fn create_pr_plan(
    branch: &str,
    project: &ProjectConfig,
    pattern: Option<&BranchPattern>,
    overrides: &PrOverrides,
    body: String,
) -> Result<PrPlan> {
    let is_release = pattern.is_some_and(|p| p.pr_type == crate::config::PrType::Release);
    let base = overrides.base.clone().unwrap_or_else(|| {
        match (&project.development_branch, is_release) {
            (Some(dev), false) => dev.clone(),
            _ => project.default_branch.clone(),
        }
    });

    if base == branch {
        return Err(Error::Config(format!(
            "cannot open a PR from '{branch}' into itself; switch to a feature branch"
        )));
    }

    let title = overrides
        .title
        .clone()
        .or_else(|| pattern.map(|p| generate_pr_title(branch, p)))
        .unwrap_or_else(|| branch.to_string());

    let mut labels: Vec<String> = Vec::new();
    let pattern_labels = pattern.map(|p| p.labels.as_slice()).unwrap_or_default();
    for label in project.default_labels.iter().chain(pattern_labels) {
        if !labels.contains(label) {
            labels.push(label.clone());
        }
    }

    Ok(PrPlan {
        head: branch.to_string(),
        base,
        title,
        body,
        replace_body: overrides.replace_body,
        draft: overrides.draft || pattern.is_some_and(|p| p.draft),
        labels,
    })
}
