//! Catalog file persistence
//!
//! Reading catalogs, keeping a `.old` backup of the pre-pull content and
//! replacing catalogs with atomic writes (write to temp file, then rename).
//!
//! Files next to each catalog:
//! - `<file>.old` - content before the most recent pull
//! - `<file>.tmp` - transient, only exists during a write

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{SyncError, SyncResult};

/// Suffix of the pre-pull backup
pub const BACKUP_SUFFIX: &str = "old";

/// Suffix of the temporary file used for atomic writes
const TEMP_SUFFIX: &str = "tmp";

/// `<path>.<suffix>`, keeping the original extension
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Location of the backup for a catalog (`messages.po` → `messages.po.old`)
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, BACKUP_SUFFIX)
}

/// Read a catalog file
pub fn read_file(path: &Path) -> SyncResult<Vec<u8>> {
    fs::read(path).map_err(|e| SyncError::from_read(e, path.to_path_buf()))
}

/// Store `bytes` as the backup of `path`, replacing any previous backup
pub fn write_backup(path: &Path, bytes: &[u8]) -> SyncResult<PathBuf> {
    let backup = backup_path(path);
    atomic_write(&backup, bytes).map_err(|e| match e {
        SyncError::WriteError { source, .. } | SyncError::PermissionDenied { source, .. } => {
            SyncError::Backup {
                path: path.to_path_buf(),
                backup_path: backup.clone(),
                source,
            }
        }
        other => other,
    })?;
    debug!("Backed up {:?} to {:?}", path, backup);
    Ok(backup)
}

/// Write data to a file atomically
///
/// 1. Write to `<path>.tmp` in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The target is never left partially written.
pub fn atomic_write(path: &Path, data: &[u8]) -> SyncResult<()> {
    let temp_path = with_suffix(path, TEMP_SUFFIX);
    let to_err = |e| SyncError::from_write(e, temp_path.clone());

    let mut file = File::create(&temp_path).map_err(to_err)?;
    file.write_all(data).map_err(to_err)?;
    file.sync_all().map_err(to_err)?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        SyncError::from_write(e, path.to_path_buf())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_path_keeps_extension() {
        assert_eq!(
            backup_path(Path::new("/l/es/LC_MESSAGES/messages.po")),
            PathBuf::from("/l/es/LC_MESSAGES/messages.po.old")
        );
    }

    #[test]
    fn test_backup_overwrites_previous() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("messages.po");
        fs::write(&path, "current").unwrap();
        fs::write(backup_path(&path), "stale backup").unwrap();

        let backup = write_backup(&path, b"current").unwrap();

        assert_eq!(fs::read_to_string(backup).unwrap(), "current");
        assert_eq!(fs::read_to_string(&path).unwrap(), "current");
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("messages.po");
        fs::write(&path, "old content").unwrap();

        atomic_write(&path, b"new content").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");
        assert!(!with_suffix(&path, TEMP_SUFFIX).exists());
    }

    #[test]
    fn test_atomic_write_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("messages.po");

        let err = atomic_write(&path, b"data").unwrap_err();
        assert!(matches!(err, SyncError::WriteError { .. }));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_file(Path::new("/nope/messages.po")).unwrap_err();
        assert!(matches!(err, SyncError::NotFound { .. }));
    }
}
