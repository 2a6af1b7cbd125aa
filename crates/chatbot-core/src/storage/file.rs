use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{validate_key, KeyValueStore};
use crate::error::ChatError;

/// Stores each key as `<base_dir>/<key>.json`.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, ChatError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|e| {
            ChatError::storage(format!(
                "Failed to create data directory {}: {}",
                base_dir.display(),
                e
            ))
        })?;

        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, ChatError> {
        validate_key(key)?;
        Ok(self.base_dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ChatError> {
        let path = self.key_path(key)?;

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ChatError::storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatError> {
        let path = self.key_path(key)?;

        // Write-then-rename so a crash never leaves a half-written value.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value).map_err(|e| {
            ChatError::storage(format!(
                "Failed to write temporary file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        fs::rename(&tmp_path, &path).map_err(|e| {
            ChatError::storage(format!("Failed to rename {}: {}", tmp_path.display(), e))
        })?;

        debug!(key, bytes = value.len(), "stored key");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ChatError> {
        let path = self.key_path(key)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "removed key");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ChatError::storage(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert_eq!(store.get("chats").unwrap(), None);
    }

    #[test]
    fn test_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.set("chats", "[]").unwrap();
        assert_eq!(store.get("chats").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("chats.json").exists());
        assert!(!dir.path().join("chats.json.tmp").exists());

        store.set("chats", "[1]").unwrap();
        assert_eq!(store.get("chats").unwrap().as_deref(), Some("[1]"));

        store.remove("chats").unwrap();
        assert_eq!(store.get("chats").unwrap(), None);
        // Removing twice is fine.
        store.remove("chats").unwrap();
    }

    #[test]
    fn test_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::new(&nested).unwrap();
        store.set("k", "v").unwrap();
        assert!(nested.join("k.json").exists());
        assert_eq!(store.base_dir(), nested.as_path());
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("data")).unwrap();

        assert!(matches!(
            store.set("../escape", "x"),
            Err(ChatError::Storage(_))
        ));
        assert!(!dir.path().join("escape.json").exists());
    }
}
