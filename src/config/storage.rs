//! Persistence for global (`<config dir>/autopr/`) and project (`.autopr.json`)
//! configuration.

use super::{AiConfig, Config, GlobalConfig, Language, ProjectConfig};
use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name for autopr under the user config directory.
const APP_DIR: &str = "autopr";

/// Filename for global config.
pub const GLOBAL_CONFIG_FILE: &str = "config.json";

/// Filename for project config at the repository root.
pub const PROJECT_CONFIG_FILE: &str = ".autopr.json";

/// Filename for persisted round-robin positions.
pub const ROTATION_STATE_FILE: &str = "reviewer-state.json";

/// Directory holding PR body templates.
pub const TEMPLATES_DIR: &str = "templates";

/// Locations of the configuration files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Per-user directory (`~/.config/autopr` on Linux)
    pub global_dir: PathBuf,
    /// Repository root
    pub project_root: PathBuf,
}

impl ConfigPaths {
    /// Paths with explicit directories
    pub fn new(global_dir: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            global_dir: global_dir.into(),
            project_root: project_root.into(),
        }
    }

    /// Paths for the current user and the given repository root
    ///
    /// `AUTOPR_CONFIG_DIR` overrides the per-user directory.
    pub fn for_repo(project_root: impl Into<PathBuf>) -> Result<Self> {
        let global_dir = if let Some(dir) = std::env::var_os("AUTOPR_CONFIG_DIR") {
            PathBuf::from(dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?
                .join(APP_DIR)
        };
        Ok(Self::new(global_dir, project_root))
    }

    /// Global config file
    pub fn global_config(&self) -> PathBuf {
        self.global_dir.join(GLOBAL_CONFIG_FILE)
    }

    /// Project config file
    pub fn project_config(&self) -> PathBuf {
        self.project_root.join(PROJECT_CONFIG_FILE)
    }

    /// Rotation state file
    pub fn rotation_state(&self) -> PathBuf {
        self.global_dir.join(ROTATION_STATE_FILE)
    }

    /// Templates directory
    pub fn templates_dir(&self) -> PathBuf {
        self.global_dir.join(TEMPLATES_DIR)
    }
}

/// Partial configuration change
///
/// `None` leaves a field untouched. Fields are routed to the global or
/// project file by [`update_config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    /// Global: language
    pub language: Option<Language>,
    /// Global: stored token (`Some(None)` clears it)
    pub github_token: Option<Option<String>>,
    /// Global: AI backend (`Some(None)` clears it)
    pub ai: Option<Option<AiConfig>>,
    /// Project: base branch
    pub default_branch: Option<String>,
    /// Project: integration branch
    pub development_branch: Option<Option<String>>,
    /// Project: default reviewers
    pub default_reviewers: Option<Vec<String>>,
    /// Project: default labels
    pub default_labels: Option<Vec<String>>,
    /// Project: reviewer groups (full replacement)
    pub reviewer_groups: Option<Vec<super::ReviewerGroup>>,
    /// Project: branch patterns (full replacement)
    pub branch_patterns: Option<Vec<super::BranchPattern>>,
}

impl ConfigUpdate {
    fn touches_global(&self) -> bool {
        self.language.is_some() || self.github_token.is_some() || self.ai.is_some()
    }

    fn touches_project(&self) -> bool {
        self.default_branch.is_some()
            || self.development_branch.is_some()
            || self.default_reviewers.is_some()
            || self.default_labels.is_some()
            || self.reviewer_groups.is_some()
            || self.branch_patterns.is_some()
    }

    fn apply_global(&self, global: &mut GlobalConfig) {
        if let Some(language) = self.language {
            global.language = language;
        }
        if let Some(token) = &self.github_token {
            global.github_token.clone_from(token);
        }
        if let Some(ai) = &self.ai {
            global.ai.clone_from(ai);
        }
    }

    fn apply_project(&self, project: &mut ProjectConfig) {
        if let Some(branch) = &self.default_branch {
            project.default_branch.clone_from(branch);
        }
        if let Some(dev) = &self.development_branch {
            project.development_branch.clone_from(dev);
        }
        if let Some(reviewers) = &self.default_reviewers {
            project.default_reviewers.clone_from(reviewers);
        }
        if let Some(labels) = &self.default_labels {
            project.default_labels.clone_from(labels);
        }
        if let Some(groups) = &self.reviewer_groups {
            project.reviewer_groups.clone_from(groups);
        }
        if let Some(patterns) = &self.branch_patterns {
            project.branch_patterns.clone_from(patterns);
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Write JSON via a sibling temp file and rename, creating parent directories.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        fs::create_dir_all(dir)?;
    }

    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, content)?;
    fs::rename(&tmp, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })?;
    Ok(())
}

/// Load the global config, or defaults when the file doesn't exist.
pub fn load_global_config(paths: &ConfigPaths) -> Result<GlobalConfig> {
    let path = paths.global_config();
    if !path.exists() {
        debug!(path = %path.display(), "no global config, using defaults");
        return Ok(GlobalConfig::default());
    }
    read_json(&path)
}

/// Load and validate the project config.
///
/// A missing file is [`Error::NotConfigured`].
pub fn load_project_config(paths: &ConfigPaths) -> Result<ProjectConfig> {
    let path = paths.project_config();
    if !path.exists() {
        return Err(Error::NotConfigured(format!(
            "{} not found; run 'autopr init' first",
            path.display()
        )));
    }
    let project: ProjectConfig = read_json(&path)?;
    project.validate()?;
    Ok(project)
}

/// Save the global config.
pub fn save_global_config(paths: &ConfigPaths, global: &GlobalConfig) -> Result<()> {
    write_json_atomic(&paths.global_config(), global)
}

/// Validate and save the project config.
pub fn save_project_config(paths: &ConfigPaths, project: &ProjectConfig) -> Result<()> {
    project.validate()?;
    write_json_atomic(&paths.project_config(), project)
}

/// Load global and project configuration into one validated view.
pub fn load_config(paths: &ConfigPaths) -> Result<Config> {
    let global = load_global_config(paths)?;
    let project = load_project_config(paths)?;
    Ok(Config { global, project })
}

/// Apply a partial update and return the reloaded config.
///
/// Global and project files are written independently; if the project write
/// fails after the global write succeeded, the global change stays.
pub fn update_config(paths: &ConfigPaths, update: &ConfigUpdate) -> Result<Config> {
    if update.touches_global() {
        let mut global = load_global_config(paths)?;
        update.apply_global(&mut global);
        save_global_config(paths, &global)?;
        debug!("global config updated");
    }

    if update.touches_project() {
        let mut project = load_project_config(paths)?;
        update.apply_project(&mut project);
        save_project_config(paths, &project)?;
        debug!("project config updated");
    }

    load_config(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReviewerGroup, RotationStrategy};
    use tempfile::TempDir;

    fn setup() -> (TempDir, ConfigPaths) {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::new(temp.path().join("global"), temp.path().join("repo"));
        fs::create_dir_all(&paths.project_root).unwrap();
        (temp, paths)
    }

    #[test]
    fn test_paths() {
        let paths = ConfigPaths::new("/home/u/.config/autopr", "/src/repo");
        assert!(paths.global_config().ends_with("autopr/config.json"));
        assert!(paths.project_config().ends_with("repo/.autopr.json"));
        assert!(paths.rotation_state().ends_with("autopr/reviewer-state.json"));
        assert!(paths.templates_dir().ends_with("autopr/templates"));
    }

    #[test]
    fn test_missing_project_is_not_configured() {
        let (_temp, paths) = setup();
        match load_config(&paths) {
            Err(Error::NotConfigured(_)) => {}
            other => panic!("expected NotConfigured, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_global_uses_defaults() {
        let (_temp, paths) = setup();
        save_project_config(&paths, &ProjectConfig::new("main")).unwrap();

        let config = load_config(&paths).unwrap();
        assert_eq!(config.global, GlobalConfig::default());
        assert_eq!(config.project.default_branch, "main");
    }

    #[test]
    fn test_invalid_project_rejected_on_load() {
        let (_temp, paths) = setup();
        fs::write(
            paths.project_config(),
            r#"{"defaultBranch": "main", "branchPatterns": [{"pattern": "feat/[", "type": "feat"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            load_config(&paths),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_update_splits_global_and_project() {
        let (_temp, paths) = setup();
        save_project_config(&paths, &ProjectConfig::new("main")).unwrap();

        let update = ConfigUpdate {
            language: Some(Language::Ko),
            reviewer_groups: Some(vec![ReviewerGroup {
                name: "core".to_string(),
                members: vec!["a".to_string()],
                rotation_strategy: RotationStrategy::Random,
            }]),
            ..ConfigUpdate::default()
        };
        let config = update_config(&paths, &update).unwrap();

        assert_eq!(config.global.language, Language::Ko);
        assert_eq!(config.project.reviewer_groups.len(), 1);

        let raw_global = fs::read_to_string(paths.global_config()).unwrap();
        assert!(raw_global.contains("\"ko\""));
        assert!(!raw_global.contains("reviewerGroups"));
        let raw_project = fs::read_to_string(paths.project_config()).unwrap();
        assert!(raw_project.contains("\"rotationStrategy\": \"random\""));
    }

    #[test]
    fn test_update_global_only_leaves_project_untouched() {
        let (_temp, paths) = setup();
        save_project_config(&paths, &ProjectConfig::new("main")).unwrap();
        let before = fs::read_to_string(paths.project_config()).unwrap();

        let update = ConfigUpdate {
            github_token: Some(Some("ghp_x".to_string())),
            ..ConfigUpdate::default()
        };
        let config = update_config(&paths, &update).unwrap();

        assert_eq!(config.global.github_token.as_deref(), Some("ghp_x"));
        assert_eq!(fs::read_to_string(paths.project_config()).unwrap(), before);
    }

    #[test]
    fn test_update_without_project_fails_after_global_write() {
        let (_temp, paths) = setup();
        let update = ConfigUpdate {
            language: Some(Language::Ko),
            default_branch: Some("develop".to_string()),
            ..ConfigUpdate::default()
        };
        assert!(update_config(&paths, &update).is_err());
        // No rollback: the global half was persisted
        assert_eq!(load_global_config(&paths).unwrap().language, Language::Ko);
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let (temp, _paths) = setup();
        let path = temp.path().join("nested").join("state.json");
        write_json_atomic(&path, &serde_json::json!({"a": 1})).unwrap();

        assert!(path.exists());
        assert!(!temp.path().join("nested").join("state.json.tmp").exists());
    }
}
