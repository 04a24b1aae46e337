//! Cache store backends.
//!
//! A store holds named caches keyed by version tag, each mapping asset paths
//! to bodies. Operations are atomic at the single-entry level and safe to
//! call concurrently; deletion is idempotent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{bail, Context, Result};

/// Storage for versioned asset caches.
///
/// `Sync` is required: install pre-fetches and activate deletions run in
/// parallel against a shared store reference.
pub trait CacheStore: Sync {
    /// Tags of every cache currently present.
    fn list(&self) -> Vec<String>;

    /// Delete the cache for `tag`. Returns whether it existed; deleting a
    /// missing tag is not an error.
    fn delete(&self, tag: &str) -> bool;

    /// Store one asset body under `tag`, creating the cache if absent.
    fn put(&self, tag: &str, path: &str, body: &[u8]) -> Result<()>;

    /// Exact-path lookup in the cache for `tag`.
    fn get(&self, tag: &str, path: &str) -> Option<Vec<u8>>;

    /// Total bytes held across all caches.
    fn usage_bytes(&self) -> u64;
}

// ========================
// In-memory backend
// ========================

/// In-memory store for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    caches: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn list(&self) -> Vec<String> {
        self.caches
            .read()
            .expect("cache lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    fn delete(&self, tag: &str) -> bool {
        self.caches
            .write()
            .expect("cache lock poisoned")
            .remove(tag)
            .is_some()
    }

    fn put(&self, tag: &str, path: &str, body: &[u8]) -> Result<()> {
        self.caches
            .write()
            .expect("cache lock poisoned")
            .entry(tag.to_string())
            .or_default()
            .insert(path.to_string(), body.to_vec());
        Ok(())
    }

    fn get(&self, tag: &str, path: &str) -> Option<Vec<u8>> {
        self.caches
            .read()
            .expect("cache lock poisoned")
            .get(tag)?
            .get(path)
            .cloned()
    }

    fn usage_bytes(&self) -> u64 {
        self.caches
            .read()
            .expect("cache lock poisoned")
            .values()
            .flat_map(|entries| entries.values())
            .map(|body| body.len() as u64)
            .sum()
    }
}

// ========================
// Filesystem backend
// ========================

/// Directory-backed store: one subdirectory per version tag under a root.
#[derive(Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn new(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("Failed to create store root: {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn tag_dir(&self, tag: &str) -> PathBuf {
        self.root.join(tag)
    }

    /// Map an asset path to a file path inside the tag directory.
    ///
    /// Leading `./` is stripped; parent traversal is rejected so a manifest
    /// entry can never escape the store root.
    fn entry_path(&self, tag: &str, path: &str) -> Result<PathBuf> {
        let trimmed = path.trim_start_matches("./");
        if trimmed.is_empty() {
            bail!("Empty asset path");
        }
        for component in Path::new(trimmed).components() {
            if matches!(component, std::path::Component::ParentDir) {
                bail!("Asset path escapes the store: {}", path);
            }
        }
        Ok(self.tag_dir(tag).join(trimmed))
    }
}

impl CacheStore for DirStore {
    fn list(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("failed to list store root {}: {}", self.root.display(), err);
                return Vec::new();
            }
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect()
    }

    fn delete(&self, tag: &str) -> bool {
        let dir = self.tag_dir(tag);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => true,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => false,
            Err(err) => {
                log::error!("failed to delete cache {}: {}", tag, err);
                false
            }
        }
    }

    fn put(&self, tag: &str, path: &str, body: &[u8]) -> Result<()> {
        let file = self.entry_path(tag, path)?;
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;
        }
        std::fs::write(&file, body)
            .with_context(|| format!("Failed to write cache entry: {}", file.display()))
    }

    fn get(&self, tag: &str, path: &str) -> Option<Vec<u8>> {
        let file = self.entry_path(tag, path).ok()?;
        std::fs::read(file).ok()
    }

    fn usage_bytes(&self) -> u64 {
        fn dir_size(dir: &Path) -> u64 {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return 0;
            };
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| {
                    let path = entry.path();
                    if path.is_dir() {
                        dir_size(&path)
                    } else {
                        entry.metadata().map(|m| m.len()).unwrap_or(0)
                    }
                })
                .sum()
        }
        dir_size(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise_store(store: &dyn CacheStore) {
        assert!(store.list().is_empty());
        assert_eq!(store.get("v1", "index.html"), None);

        store.put("v1", "index.html", b"<html>").unwrap();
        store.put("v1", "drills/drill1.png", b"png").unwrap();
        store.put("v2", "index.html", b"<html v2>").unwrap();

        assert_eq!(store.get("v1", "index.html"), Some(b"<html>".to_vec()));
        assert_eq!(store.get("v2", "index.html"), Some(b"<html v2>".to_vec()));
        assert_eq!(store.get("v1", "drills/drill1.png"), Some(b"png".to_vec()));

        let mut tags = store.list();
        tags.sort();
        assert_eq!(tags, vec!["v1", "v2"]);
        assert_eq!(store.usage_bytes(), 18);

        assert!(store.delete("v1"));
        assert!(!store.delete("v1"), "deletion is idempotent");
        assert_eq!(store.get("v1", "index.html"), None);
        assert_eq!(store.list(), vec!["v2"]);
    }

    #[test]
    fn test_memory_store() {
        exercise_store(&MemoryStore::new());
    }

    #[test]
    fn test_dir_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path()).unwrap();
        exercise_store(&store);
    }

    #[test]
    fn test_dir_store_overwrites_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path()).unwrap();
        store.put("v1", "style.css", b"old").unwrap();
        store.put("v1", "style.css", b"new").unwrap();
        assert_eq!(store.get("v1", "style.css"), Some(b"new".to_vec()));
    }

    #[test]
    fn test_dir_store_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path()).unwrap();
        assert!(store.put("v1", "../escape.txt", b"x").is_err());
        assert!(store.put("v1", "", b"x").is_err());
    }

    #[test]
    fn test_dir_store_strips_relative_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path()).unwrap();
        store.put("v1", "./index.html", b"doc").unwrap();
        assert_eq!(store.get("v1", "index.html"), Some(b"doc".to_vec()));
    }
}
