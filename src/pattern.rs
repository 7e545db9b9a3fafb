//! Branch pattern matching and PR text generation
//!
//! Patterns are evaluated in declaration order and the first match wins;
//! specificity plays no role.

use crate::config::{BranchPattern, Language};
use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use std::path::Path;
use tracing::{debug, warn};

// `*` may cross `/`, so `feat/*` also covers `feat/ui/button`.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compile a branch glob, mapping parse failures to [`Error::InvalidPattern`]
pub fn compile(glob: &str) -> Result<Pattern> {
    Pattern::new(glob).map_err(|e| Error::InvalidPattern {
        pattern: glob.to_string(),
        message: e.msg.to_string(),
    })
}

/// Find the first pattern whose glob matches `branch`
///
/// `None` means no automation applies to this branch. Patterns that fail to
/// compile are skipped (config loading already rejects them).
pub fn find_matching_pattern<'a>(
    patterns: &'a [BranchPattern],
    branch: &str,
) -> Option<&'a BranchPattern> {
    let found = patterns.iter().find(|p| {
        compile(&p.pattern).is_ok_and(|glob| glob.matches_with(branch, MATCH_OPTIONS))
    });
    match found {
        Some(p) => debug!(branch, pattern = %p.pattern, pr_type = %p.pr_type, "branch matched pattern"),
        None => debug!(branch, "no branch pattern matched"),
    }
    found
}

/// Build a PR title from the branch name
///
/// `feat/add-new-button` becomes `[FEAT] Add New Button`. Branches without a
/// `/` are returned unchanged.
pub fn generate_pr_title(branch: &str, pattern: &BranchPattern) -> String {
    let Some((_, rest)) = branch.split_once('/') else {
        return branch.to_string();
    };

    let words: Vec<String> = rest
        .split('/')
        .flat_map(|segment| segment.split(['-', '_', ' ']))
        .flat_map(split_camel_case)
        .filter(|w| !w.is_empty())
        .map(|w| capitalize(&w))
        .collect();

    let prefix = pattern.pr_type.as_str().to_uppercase();
    if words.is_empty() {
        format!("[{prefix}]")
    } else {
        format!("[{prefix}] {}", words.join(" "))
    }
}

/// Split `addNewButton` into `add`, `New`, `Button`
///
/// Runs of capitals stay together (`parseHTTPResponse` → `parse`, `HTTP`,
/// `Response`).
fn split_camel_case(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Reads PR body templates from a directory of `<name>.md` files
pub trait TemplateStore {
    /// Template contents, `None` if no such template
    fn load(&self, name: &str) -> Option<String>;
}

/// Templates stored as `<dir>/<name>.md`
#[derive(Debug, Clone)]
pub struct DirTemplateStore<'a> {
    dir: &'a Path,
}

impl<'a> DirTemplateStore<'a> {
    /// Store rooted at `dir`
    pub const fn new(dir: &'a Path) -> Self {
        Self { dir }
    }
}

impl TemplateStore for DirTemplateStore<'_> {
    fn load(&self, name: &str) -> Option<String> {
        let file = if Path::new(name).extension().is_some() {
            self.dir.join(name)
        } else {
            self.dir.join(format!("{name}.md"))
        };
        std::fs::read_to_string(&file).ok()
    }
}

/// Build the PR body for a pattern
///
/// Uses the pattern's template when set and present, otherwise the default
/// checklist in the active language.
pub fn generate_pr_body(
    pattern: Option<&BranchPattern>,
    language: Language,
    templates: &dyn TemplateStore,
) -> String {
    if let Some(name) = pattern.and_then(|p| p.template.as_deref()) {
        if let Some(body) = templates.load(name) {
            return body;
        }
        warn!(template = name, "PR template not found, using default body");
    }
    default_body(language).to_string()
}

/// Default PR body checklist
pub const fn default_body(language: Language) -> &'static str {
    match language {
        Language::En => {
            "## Description\n\n\
             <!-- What does this PR change and why? -->\n\n\
             ## Checklist\n\n\
             - [ ] Tests added or updated\n\
             - [ ] Documentation updated\n\
             - [ ] Self-reviewed the changes\n"
        }
        Language::Ko => {
            "## 설명\n\n\
             <!-- 이 PR이 무엇을 왜 변경하는지 작성해 주세요 -->\n\n\
             ## 체크리스트\n\n\
             - [ ] 테스트 추가 또는 수정\n\
             - [ ] 문서 업데이트\n\
             - [ ] 변경 사항 셀프 리뷰\n"
        }
    }
}
