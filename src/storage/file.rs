//! File-backed slot storage: one `<key>.json` per slot.
//!
//! Writes go to a sibling temp file which is synced and then renamed over the
//! target, so a crash leaves either the old or the new contents.

use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{is_valid_key, StorageBackend};
use crate::error::{Error, Result};

/// Directory of JSON slot files
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default location (~/.scriptai)
    pub fn with_defaults() -> Self {
        let root = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".scriptai");
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`
    pub fn slot_path(&self, key: &str) -> Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(Error::StorageUnavailable {
                message: format!("invalid storage key '{}'", key),
                path: Some(self.root.clone()),
            });
        }
        Ok(self.root.join(format!("{}.json", key)))
    }

    fn ensure_root(&self) -> Result<()> {
        if !self.root.is_dir() {
            fs::create_dir_all(&self.root).map_err(|e| Error::StorageUnavailable {
                message: format!("failed to create storage directory: {}", e),
                path: Some(self.root.clone()),
            })?;
            debug!(path = %self.root.display(), "Created storage directory");
        }
        Ok(())
    }
}

fn write_synced(path: &Path, value: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(value.as_bytes())?;
    file.sync_all()
}

impl StorageBackend for FileStorage {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::StorageRead {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        self.ensure_root()?;

        let tmp_path = path.with_extension("json.tmp");
        let write_err = |source: io::Error| Error::StorageWrite {
            key: key.to_string(),
            source,
        };

        // The temp file never outlives a failed write
        write_synced(&tmp_path, value)
            .and_then(|()| fs::rename(&tmp_path, &path))
            .map_err(|e| {
                let _ = fs::remove_file(&tmp_path);
                write_err(e)
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_slot_is_none() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().join("never-created"));
        assert_eq!(storage.read("scriptai_personas").unwrap(), None);
    }

    #[test]
    fn test_write_creates_directory_and_file() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().join("data"));

        storage.write("scriptai_personas", "[]").unwrap();

        let path = tmp.path().join("data").join("scriptai_personas.json");
        assert!(path.exists());
        assert_eq!(storage.read("scriptai_personas").unwrap(), Some("[]".to_string()));
        // No temp file left behind
        assert!(!tmp.path().join("data").join("scriptai_personas.json.tmp").exists());
    }

    #[test]
    fn test_overwrite() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path());
        storage.write("k", "[1,2,3]").unwrap();
        storage.write("k", "[4]").unwrap();
        assert_eq!(storage.read("k").unwrap(), Some("[4]".to_string()));
    }

    #[test]
    fn test_empty_file_reads_as_none() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("k.json"), "  \n").unwrap();
        let storage = FileStorage::new(tmp.path());
        assert_eq!(storage.read("k").unwrap(), None);
    }

    #[test]
    fn test_rejects_path_traversal() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path());
        assert!(storage.write("../outside", "[]").is_err());
        assert!(storage.read("a/b").is_err());
    }

    #[test]
    fn test_root_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let storage = FileStorage::new(&blocker);
        let err = storage.write("k", "[]").unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }

    #[test]
    fn test_failed_write_removes_temp_file() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path());
        // A non-empty directory where the slot file should go makes the rename fail
        let slot_dir = tmp.path().join("k.json");
        fs::create_dir_all(slot_dir.join("inner")).unwrap();

        let err = storage.write("k", "[]").unwrap_err();
        assert!(matches!(err, Error::StorageWrite { .. }));
        assert!(!tmp.path().join("k.json.tmp").exists());
        assert!(slot_dir.join("inner").is_dir());
    }
}
