use std::path::Path;

use redb::backends::InMemoryBackend;
use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

fn storage_err(e: impl std::fmt::Display) -> KVError {
    KVError::Storage(e.to_string())
}

/// RedbStore is a KVStore implementation backed by redb, a pure-Rust
/// embedded key-value database. Every write is its own committed
/// transaction. The database file is released when the store is dropped.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(storage_err)?;
        }
        let db = Database::create(path).map_err(storage_err)?;
        debug!("opened redb store at {}", path.display());
        Self::init(db)
    }

    /// Create a volatile database that lives only as long as this store.
    pub fn open_in_memory() -> Result<Self, KVError> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(storage_err)?;
        Self::init(db)
    }

    fn init(db: Database) -> Result<Self, KVError> {
        // Ensure the table exists so read transactions never miss it.
        let write_txn = db.begin_write().map_err(storage_err)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;

        Ok(Self { db })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(TABLE).map_err(storage_err)?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage_err)?;
            table.insert(key, value).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, KVError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        let existed = {
            let mut table = write_txn.open_table(TABLE).map_err(storage_err)?;
            let removed = table.remove(key).map_err(storage_err)?;
            removed.is_some()
        };
        write_txn.commit().map_err(storage_err)?;
        Ok(existed)
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(TABLE).map_err(storage_err)?;

        let mut results = Vec::new();
        let iter = table.range(prefix..).map_err(storage_err)?;

        for entry in iter {
            let entry = entry.map_err(storage_err)?;
            let key = entry.0.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            let value = entry.1.value().to_vec();
            results.push((key, value));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_roundtrip_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data.redb");

        {
            let store = RedbStore::open(&path).unwrap();
            store.set("zombies:1", b"one").unwrap();
            assert_eq!(store.get("zombies:1").unwrap(), Some(b"one".to_vec()));
        }

        // Data survives closing and reopening the file.
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get("zombies:1").unwrap(), Some(b"one".to_vec()));
        assert_eq!(store.get("zombies:2").unwrap(), None);
    }

    #[test]
    fn delete_reports_existence() {
        let store = RedbStore::open_in_memory().unwrap();
        store.set("k", b"v").unwrap();
        assert!(store.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn scan_is_prefix_bounded_and_sorted() {
        let store = RedbStore::open_in_memory().unwrap();
        store.set("zombies:b", b"2").unwrap();
        store.set("zombies:a", b"1").unwrap();
        store.set("zombiesx:c", b"3").unwrap();
        store.set("other:d", b"4").unwrap();

        let entries = store.scan("zombies:").unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zombies:a", "zombies:b"]);
    }
}
