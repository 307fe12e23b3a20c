// Key-value storage backends for the task store

use crate::error::StoreError;
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Durable key-value slot the task collection is mirrored into
///
/// Read failures surface as [`StoreError::StorageRead`], write failures
/// as [`StoreError::StorageWrite`].
pub trait Storage {
    /// Value stored under `key`, `None` if the key is absent
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }
}

/// SQLite-backed storage, one row per key
pub struct SqliteStorage {
    db: Connection,
}

impl SqliteStorage {
    /// Open or create the database at `path` and ensure the kv schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Connection::open(path.as_ref()).map_err(StoreError::read)?;
        let storage = Self { db };
        storage.create_schema()?;
        Ok(storage)
    }

    /// Purely in-memory database, handy for short-lived sessions
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Connection::open_in_memory().map_err(StoreError::read)?;
        let storage = Self { db };
        storage.create_schema()?;
        Ok(storage)
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        debug!("Creating kv schema");

        self.db
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                );",
            )
            .map_err(StoreError::read)?;

        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .map_err(StoreError::read)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.db
            .execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, now_ms()],
            )
            .map(|_| ())
            .map_err(StoreError::write)
    }
}

/// Flat-file storage, one `<key>.json` file per key
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open a storage directory, creating it if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(StoreError::read)?;
        Ok(Self { base_path })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&path).map_err(StoreError::read)?;
        file.lock_shared().map_err(StoreError::read)?;

        let mut value = String::new();
        file.read_to_string(&mut value).map_err(StoreError::read)?;

        // Lock is released when file is dropped
        Ok(Some(value))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        let tmp_path = self.base_path.join(format!("{key}.json.tmp"));

        // Write the full value to a temp file, fsync, then rename into
        // place so readers never observe a half-written value.
        let mut tmp = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(StoreError::write)?;
        tmp.lock_exclusive().map_err(StoreError::write)?;

        tmp.write_all(value.as_bytes()).map_err(StoreError::write)?;
        tmp.sync_all().map_err(StoreError::write)?;
        fs::rename(&tmp_path, &path).map_err(StoreError::write)?;

        Ok(())
    }
}

/// In-memory storage for tests and embedding
#[derive(Default, Debug)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// Helper function for the kv updated_at column
fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time before Unix epoch")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sqlite_absent_key() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert!(storage.read("TASKS").unwrap().is_none());
    }

    #[test]
    fn test_sqlite_write_then_read() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.write("TASKS", "[]").unwrap();
        assert_eq!(storage.read("TASKS").unwrap().as_deref(), Some("[]"));

        // Overwrite replaces the value
        storage.write("TASKS", r#"[{"a":1}]"#).unwrap();
        assert_eq!(storage.read("TASKS").unwrap().as_deref(), Some(r#"[{"a":1}]"#));
    }

    #[test]
    fn test_sqlite_persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("taskpad.db");

        {
            let storage = SqliteStorage::open(&db_path).unwrap();
            storage.write("TASKS", "[1,2,3]").unwrap();
        }

        let storage = SqliteStorage::open(&db_path).unwrap();
        assert_eq!(storage.read("TASKS").unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_file_absent_key() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::open(temp.path()).unwrap();
        assert!(storage.read("TASKS").unwrap().is_none());
    }

    #[test]
    fn test_file_write_then_read() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::open(temp.path()).unwrap();

        storage.write("TASKS", "[]").unwrap();
        assert_eq!(storage.read("TASKS").unwrap().as_deref(), Some("[]"));

        storage.write("TASKS", r#"[{"a":1}]"#).unwrap();
        assert_eq!(storage.read("TASKS").unwrap().as_deref(), Some(r#"[{"a":1}]"#));

        // Value lives in a file named after the key
        assert!(temp.path().join("TASKS.json").exists());
    }

    #[test]
    fn test_file_no_temp_left_behind() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::open(temp.path()).unwrap();

        storage.write("TASKS", "[]").unwrap();
        assert!(!temp.path().join("TASKS.json.tmp").exists());
    }

    #[test]
    fn test_memory_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.read("TASKS").unwrap().is_none());

        storage.write("TASKS", "[]").unwrap();
        assert_eq!(storage.read("TASKS").unwrap().as_deref(), Some("[]"));
    }
}
