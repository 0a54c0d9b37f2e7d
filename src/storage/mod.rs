/// Key-value persistence abstraction for the catalog and session blobs
///
/// The wizard only ever needs `get`, `set` and `remove` on opaque strings
/// under a handful of fixed keys. This module provides that contract as a
/// trait that can be mocked with `mockall`, plus an in-memory store for
/// tests and embedding and a directory-backed store for real use.
///
/// # Examples
///
/// ```rust
/// use inochi_triage::storage::{KeyValueStore, MemoryStore};
///
/// # fn main() -> anyhow::Result<()> {
/// let store = MemoryStore::new();
/// store.set("inochi_session_v1", "{}")?;
/// assert_eq!(store.get("inochi_session_v1")?.as_deref(), Some("{}"));
/// # Ok(())
/// # }
/// ```
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Trait for blob persistence that can be mocked in tests
///
/// Implementations are assumed never to interleave with themselves; a `set`
/// replaces the whole value under its key.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Drop the blob stored under `key`; absent keys are not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store backed by a map
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Store that keeps one `<key>.json` file per key inside a directory
///
/// Writes go to a sibling temporary file first and are renamed into place,
/// so a reader never observes a half-written aggregate.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for DirectoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("creating {}", self.root.display()))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &path).with_context(|| format!("replacing {}", path.display()))?;

        tracing::debug!(key = %key, bytes = value.len(), "Persisted blob");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
        }
    }
}
