//! File-state primitives shared by every command that rewrites a file.

use crate::errors::{ObsError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// Outcome of an operation that is safe to repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdempotentResult {
    /// The target was rewritten.
    Changed,
    /// The target already had the desired content; nothing was written.
    Unchanged,
    /// Dry run: the target would be rewritten.
    WouldChange(String),
    /// The operation does not apply to this target.
    NotApplicable(String),
}

impl IdempotentResult {
    pub fn is_changed(&self) -> bool {
        matches!(self, IdempotentResult::Changed)
    }
}

impl std::fmt::Display for IdempotentResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdempotentResult::Changed => write!(f, "changed"),
            IdempotentResult::Unchanged => write!(f, "unchanged"),
            IdempotentResult::WouldChange(what) => write!(f, "{what}"),
            IdempotentResult::NotApplicable(why) => write!(f, "not applicable: {why}"),
        }
    }
}

/// Write `content` to `path` through a sibling temp file and a rename, so a
/// reader never sees a half-written file.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let temp_path = parent.join(format!(".{}.tmp", Uuid::new_v4()));

    let write = || -> std::io::Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        Ok(())
    };
    if let Err(e) = write() {
        let _ = fs::remove_file(&temp_path);
        return Err(ObsError::io(&temp_path, e));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(ObsError::io(path, e));
    }

    debug!(path = %path.display(), bytes = content.len(), "wrote file atomically");
    Ok(())
}

/// Read a file if it exists. `Ok(None)` means the file is absent.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ObsError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_creates_and_replaces() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        atomic_write(&path, b"{}\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");

        atomic_write(&path, b"{\"a\": 1}\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\": 1}\n");

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_atomic_write_missing_parent_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("settings.json");
        assert!(matches!(atomic_write(&path, b"x"), Err(ObsError::Io { .. })));
    }

    #[test]
    fn test_read_optional() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        assert_eq!(read_optional(&path).unwrap(), None);
        fs::write(&path, "hi").unwrap();
        assert_eq!(read_optional(&path).unwrap().as_deref(), Some("hi"));
    }
}
