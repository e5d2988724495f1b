//! `cc-obs clear`: delete the event log and the rendered view.

use super::helpers::{NO_PROJECT, print_error};
use anyhow::{Context, Result};
use cc_obs_common::find_project_root;
use cc_obs_common::project::{events_path, view_path};
use std::fs;
use std::path::Path;
use tracing::debug;

pub fn run(quiet: bool) -> Result<i32> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let Some(root) = find_project_root(&cwd) else {
        if quiet {
            return Ok(0);
        }
        print_error(NO_PROJECT);
        return Ok(1);
    };

    let deleted = clear_project(&root)?;
    if !quiet {
        if deleted.is_empty() {
            println!("Nothing to clear");
        } else {
            println!("Cleared: {}", deleted.join(", "));
        }
    }
    Ok(0)
}

/// Remove the log and view files of the project at `root`. Returns the names
/// of the files that existed.
pub fn clear_project(root: &Path) -> Result<Vec<String>> {
    let mut deleted = Vec::new();
    for path in [events_path(root), view_path(root)] {
        if remove_if_exists(&path)? {
            debug!(path = %path.display(), "removed");
            deleted.push(file_name(&path));
        }
    }
    Ok(deleted)
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".claude/cc-obs")).unwrap();
        dir
    }

    #[test]
    fn test_clear_deletes_both_files() {
        let dir = project();
        fs::write(events_path(dir.path()), "data\n").unwrap();
        fs::write(view_path(dir.path()), "<html></html>").unwrap();

        let deleted = clear_project(dir.path()).unwrap();
        assert_eq!(deleted, ["events.jsonl", "view.html"]);
        assert!(!events_path(dir.path()).exists());
        assert!(!view_path(dir.path()).exists());
    }

    #[test]
    fn test_clear_nothing_to_clear() {
        let dir = project();
        assert!(clear_project(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_clear_only_log() {
        let dir = project();
        fs::write(events_path(dir.path()), "data\n").unwrap();
        assert_eq!(clear_project(dir.path()).unwrap(), ["events.jsonl"]);
    }
}
