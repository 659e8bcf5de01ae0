//! Durable key/value slots backing the session store.
//!
//! The contract mirrors browser local storage: string keys, string values, no schema.
//! `FileStorage` keeps all slots in one JSON object file; `MemoryStorage` lives only as
//! long as the process.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use tracing::warn;

use crate::error::{ApiError, ApiResult};

pub trait SessionStorage: Send + Sync + std::fmt::Debug {
    fn get_item(&self, key: &str) -> ApiResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> ApiResult<()>;
    fn remove_item(&self, key: &str) -> ApiResult<()>;

    /// Write several slots; backends that can do it in one write override this.
    fn set_items(&self, items: &[(&str, &str)]) -> ApiResult<()> {
        for (k, v) in items {
            self.set_item(k, v)?;
        }
        Ok(())
    }

    fn remove_items(&self, keys: &[&str]) -> ApiResult<()> {
        for k in keys {
            self.remove_item(k)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> ApiResult<Option<String>> { Ok(self.items.read().get(key).cloned()) }

    fn set_item(&self, key: &str, value: &str) -> ApiResult<()> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> ApiResult<()> {
        self.items.write().remove(key);
        Ok(())
    }

    fn set_items(&self, items: &[(&str, &str)]) -> ApiResult<()> {
        let mut m = self.items.write();
        for (k, v) in items {
            m.insert(k.to_string(), v.to_string());
        }
        Ok(())
    }
}

enum Slots {
    Map(BTreeMap<String, String>),
    Corrupt(serde_json::Error),
}

/// Owner read/write only on unix, from the moment the file exists. A leftover temp
/// file from an earlier run is truncated and narrowed as well.
#[cfg(unix)]
fn private_file(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = fs::OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn private_file(path: &Path) -> std::io::Result<File> { File::create(path) }

/// All slots in a single JSON object file. Every mutation rewrites the file through a
/// sibling temp file and a rename, so a reader never sees half a session.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path { &self.path }

    fn read_map(&self) -> ApiResult<BTreeMap<String, String>> {
        match self.load()? {
            Slots::Map(m) => Ok(m),
            Slots::Corrupt(e) => Err(ApiError::storage(format!("parse {}: {}", self.path.display(), e))),
        }
    }

    // A file that no longer parses is replaced rather than blocking every later write.
    fn read_map_for_write(&self) -> ApiResult<BTreeMap<String, String>> {
        match self.load()? {
            Slots::Map(m) => Ok(m),
            Slots::Corrupt(e) => {
                warn!(target: "kmt::session", "discarding unreadable session file {}: {}", self.path.display(), e);
                Ok(BTreeMap::new())
            }
        }
    }

    fn load(&self) -> ApiResult<Slots> {
        if !self.path.exists() {
            return Ok(Slots::Map(BTreeMap::new()));
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|e| ApiError::storage(format!("read {}: {}", self.path.display(), e)))?;
        if text.trim().is_empty() {
            return Ok(Slots::Map(BTreeMap::new()));
        }
        Ok(serde_json::from_str(&text).map_or_else(Slots::Corrupt, Slots::Map))
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> ApiResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| ApiError::storage(format!("create {}: {}", dir.display(), e)))?;
            }
        }
        let body = serde_json::to_string_pretty(map).map_err(ApiError::storage)?;
        let tmp = self.path.with_extension("tmp");
        let write_err = |e: std::io::Error| ApiError::storage(format!("write {}: {}", tmp.display(), e));
        let mut file = private_file(&tmp).map_err(write_err)?;
        file.write_all(body.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(|e| ApiError::storage(format!("rename {}: {}", self.path.display(), e)))
    }

    fn mutate(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> ApiResult<()> {
        let _guard = self.write_lock.lock();
        let mut map = self.read_map_for_write()?;
        f(&mut map);
        if map.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(|e| ApiError::storage(format!("remove {}: {}", self.path.display(), e)))?;
            }
            return Ok(());
        }
        self.write_map(&map)
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> ApiResult<Option<String>> { Ok(self.read_map()?.get(key).cloned()) }

    fn set_item(&self, key: &str, value: &str) -> ApiResult<()> {
        self.mutate(|m| {
            m.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> ApiResult<()> {
        self.mutate(|m| {
            m.remove(key);
        })
    }

    fn set_items(&self, items: &[(&str, &str)]) -> ApiResult<()> {
        self.mutate(|m| {
            for (k, v) in items {
                m.insert(k.to_string(), v.to_string());
            }
        })
    }

    fn remove_items(&self, keys: &[&str]) -> ApiResult<()> {
        self.mutate(|m| {
            for k in keys {
                m.remove(*k);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_storage_persists_across_instances() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("session.json");
        let a = FileStorage::new(&path);
        a.set_items(&[("k1", "v1"), ("k2", "v2")]).unwrap();

        let b = FileStorage::new(&path);
        assert_eq!(b.get_item("k1").unwrap().as_deref(), Some("v1"));
        assert_eq!(b.get_item("k2").unwrap().as_deref(), Some("v2"));
        assert_eq!(b.get_item("missing").unwrap(), None);
    }

    #[test]
    fn removing_last_key_deletes_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("session.json");
        let s = FileStorage::new(&path);
        s.set_item("k", "v").unwrap();
        assert!(path.exists());
        s.remove_items(&["k", "never-set"]).unwrap();
        assert!(!path.exists());
        // idempotent
        s.remove_item("k").unwrap();
    }

    #[test]
    fn unreadable_file_is_reported_then_replaced() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("session.json");
        fs::write(&path, "{{ not json").unwrap();
        let s = FileStorage::new(&path);
        assert!(matches!(s.get_item("k"), Err(ApiError::Storage(_))));
        s.set_item("k", "v").unwrap();
        assert_eq!(s.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn truncated_file_is_not_mistaken_for_io_failure() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("session.json");
        fs::write(&path, r#"{"kmt_token": "abc"#).unwrap();
        let s = FileStorage::new(&path);
        s.remove_item("kmt_token").unwrap();
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("session.json");
        // stale temp file left world-readable by an interrupted write
        fs::write(path.with_extension("tmp"), "old").unwrap();
        fs::set_permissions(path.with_extension("tmp"), fs::Permissions::from_mode(0o644)).unwrap();

        let s = FileStorage::new(&path);
        s.set_item("k", "v").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn memory_storage_roundtrip() {
        let s = MemoryStorage::new();
        s.set_item("a", "1").unwrap();
        assert_eq!(s.get_item("a").unwrap().as_deref(), Some("1"));
        s.remove_item("a").unwrap();
        assert_eq!(s.get_item("a").unwrap(), None);
    }
}
