//! Project discovery and well-known paths.

use std::path::{Path, PathBuf};

/// Directory marking a project the host agent works in.
pub const CLAUDE_DIR: &str = ".claude";

/// Which settings file hooks are written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsScope {
    /// `.claude/settings.local.json` (gitignored, per developer).
    #[default]
    Local,
    /// `.claude/settings.json` (shared with the repository).
    Project,
    /// `~/.claude/settings.json` (every project of this user).
    Global,
}

impl std::fmt::Display for SettingsScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsScope::Local => write!(f, "local"),
            SettingsScope::Project => write!(f, "project"),
            SettingsScope::Global => write!(f, "global"),
        }
    }
}

/// Walk up from `start` to the first directory containing `.claude/`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CLAUDE_DIR).is_dir())
        .map(Path::to_path_buf)
}

pub fn claude_dir(root: &Path) -> PathBuf {
    root.join(CLAUDE_DIR)
}

/// Where cc-obs keeps its own files.
pub fn obs_dir(root: &Path) -> PathBuf {
    claude_dir(root).join("cc-obs")
}

pub fn events_path(root: &Path) -> PathBuf {
    obs_dir(root).join("events.jsonl")
}

pub fn view_path(root: &Path) -> PathBuf {
    obs_dir(root).join("view.html")
}

/// Settings file for `scope`.
///
/// `root` is the project root for local and project scope, and the home
/// directory for global scope.
pub fn settings_path(root: &Path, scope: SettingsScope) -> PathBuf {
    match scope {
        SettingsScope::Local => claude_dir(root).join("settings.local.json"),
        SettingsScope::Project | SettingsScope::Global => claude_dir(root).join("settings.json"),
    }
}
