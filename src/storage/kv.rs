//! Key-value persistence backends
//!
//! A synchronous, string-valued key-value facility. Every value is a whole
//! document; `set` fully overwrites whatever was stored before.
//!
//! - `MemoryStore`: process-local map, used for tests and embedding
//! - `FileStore`: one file per key under a data directory

use crate::storage::error::{StorageError, StorageResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Synchronous string key-value storage
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if absent
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// In-memory backend
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: seed a key with a raw value
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// File-backed backend: key `k` lives in `<dir>/<k>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of this store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes `<key>.json.tmp` and renames it over the old file, so a crash
    /// leaves either the old or the new value, never a truncated one.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::create_dir_all(&self.dir)?;

        let mut file = File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = std::fs::rename(&tmp_path, &path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        tracing::trace!(path = %path.display(), bytes = value.len(), "Wrote key");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\'])
        || key.chars().any(char::is_control);
    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_basic_operations() {
        let mut store = MemoryStore::new();
        assert!(store.get("entries").unwrap().is_none());

        store.set("entries", "[]").unwrap();
        assert_eq!(store.get("entries").unwrap().as_deref(), Some("[]"));

        store.set("entries", "[1]").unwrap();
        assert_eq!(store.get("entries").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.len(), 1);

        store.remove("entries").unwrap();
        assert!(store.get("entries").unwrap().is_none());
        store.remove("entries").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_creates_directory_lazily() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("wallet");
        let mut store = FileStore::new(&root);

        assert!(store.get("entries").unwrap().is_none());
        assert!(!root.exists());

        store.set("entries", "[]").unwrap();
        assert!(root.join("entries.json").exists());
        assert_eq!(store.get("entries").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_overwrites_and_removes() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path());

        store.set("entries", "[{\"id\":1,\"amount\":5}]").unwrap();
        store.set("entries", "[]").unwrap();
        assert_eq!(store.get("entries").unwrap().as_deref(), Some("[]"));

        store.remove("entries").unwrap();
        assert!(store.get("entries").unwrap().is_none());
        // Absent key
        store.remove("entries").unwrap();
    }

    #[test]
    fn test_file_store_replaces_without_leftovers() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path());

        store.set("entries", "[1]").unwrap();
        store.set("entries", "[1,2]").unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["entries.json".to_string()]);
        assert_eq!(store.get("entries").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_file_store_ignores_stale_temp_file() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set("entries", "[1]").unwrap();

        // Interrupted write from an earlier run
        std::fs::write(dir.path().join("entries.json.tmp"), "[1,").unwrap();
        assert_eq!(store.get("entries").unwrap().as_deref(), Some("[1]"));

        store.set("entries", "[]").unwrap();
        assert_eq!(store.get("entries").unwrap().as_deref(), Some("[]"));
        assert!(!dir.path().join("entries.json.tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_bad_keys() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path());

        for key in ["", ".", "..", "a/b", "a\\b", "tab\there"] {
            assert!(matches!(
                store.set(key, "[]"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut store = MemoryStore::new();
        {
            let mut borrowed: &mut MemoryStore = &mut store;
            KeyValueStore::set(&mut borrowed, "k", "v").unwrap();
        }
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
