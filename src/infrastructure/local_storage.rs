use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::domain::{error::StorageError, storage::KeyValueStorage};

const ENTRY_EXTENSION: &str = "json";

/// One file per key under a directory. Writes go through a temp file and a rename,
/// so readers see either the previous entry or the new one.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileStorage {
    /// Opens `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, quota: None })
    }

    /// Caps the combined size of all entries, in bytes of key plus value.
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("invalid storage key `{key}`")).into());
        }
        Ok(self.dir.join(format!("{key}.{ENTRY_EXTENSION}")))
    }

    fn used_by_others(&self, key: &str) -> Result<usize, StorageError> {
        let mut used = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
            if stem == key {
                continue;
            }
            used += stem.len() + usize::try_from(fs::metadata(&path)?.len()).unwrap_or(usize::MAX);
        }
        Ok(used)
    }
}

fn write_then_rename(tmp: &Path, path: &Path, value: &str) -> io::Result<()> {
    let mut f = File::create(tmp)?;
    f.write_all(value.as_bytes())?;
    f.sync_all()?;
    fs::rename(tmp, path)
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(quota) = self.quota {
            let needed = self.used_by_others(key)? + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        let tmp = path.with_extension(format!("{ENTRY_EXTENSION}.tmp"));
        if let Err(e) = write_then_rename(&tmp, &path, value) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage with the same quota rule as [`FileStorage`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let others: usize = self
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_missing_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        assert!(storage.get_item("tasks").unwrap().is_none());
    }

    #[test]
    fn file_storage_replaces_entry_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();
        storage.set_item("tasks", "[1]").unwrap();
        storage.set_item("tasks", "[2]").unwrap();
        assert_eq!(storage.get_item("tasks").unwrap().as_deref(), Some("[2]"));
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names, vec![std::ffi::OsString::from("tasks.json")]);
        assert!(storage.remove_item("tasks").unwrap());
        assert!(!storage.remove_item("tasks").unwrap());
    }

    #[test]
    fn file_storage_failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // a non-empty directory where the entry should go makes the rename fail
        fs::create_dir(dir.path().join("tasks.json")).unwrap();
        fs::write(dir.path().join("tasks.json").join("keep"), "x").unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();
        assert!(matches!(storage.set_item("tasks", "[]"), Err(StorageError::Io(_))));
        assert!(!dir.path().join("tasks.json.tmp").exists());
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();
        assert!(matches!(storage.set_item("../escape", "x"), Err(StorageError::Io(_))));
    }

    #[test]
    fn file_storage_quota_counts_other_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap().with_quota(Some(20));
        storage.set_item("a", "0123456789").unwrap();
        let err = storage.set_item("b", "0123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 22, quota: 20 }));
        // rewriting the same key only counts the new value
        storage.set_item("a", "0123456789abcdefg").unwrap();
    }

    #[test]
    fn memory_storage_quota_keeps_previous_value() {
        let mut storage = MemoryStorage::new().with_quota(Some(8));
        storage.set_item("k", "1234").unwrap();
        assert!(storage.set_item("k", "123456789").is_err());
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("1234"));
    }
}
