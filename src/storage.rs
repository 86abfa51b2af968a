use sled::Db;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::StorageError;

/// Persistent key-value store backing the session (token + serialized identity).
///
/// One sled database per data directory; each front end writes to its own tree
/// so the admin and tenant sessions never see each other's keys.
/// Values are UTF-8 strings, like browser local storage.
#[derive(Clone)] // sled handles are cheap to clone and share the same tree
pub struct Storage {
    db: Db,
    tree: sled::Tree,
}

impl Storage {
    /// Open or create the sled database at `path` and select the `namespace` tree.
    pub fn open(path: impl AsRef<Path>, namespace: &str) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Self::with_db(db, namespace)
    }

    /// In-memory database, removed when the last handle drops.
    pub fn temporary(namespace: &str) -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::with_db(db, namespace)
    }

    fn with_db(db: Db, namespace: &str) -> Result<Self, StorageError> {
        let tree = db.open_tree(namespace)?;
        Ok(Self { db, tree })
    }

    /// Same database, different tree.
    pub fn namespace(&self, namespace: &str) -> Result<Self, StorageError> {
        Self::with_db(self.db.clone(), namespace)
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .tree
            .get(key.as_bytes())?
            .map(|value| String::from_utf8_lossy(&value).into_owned()))
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.tree.remove(key.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }

    /// Write several entries atomically (all or none land on disk).
    pub fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut batch = sled::Batch::default();
        for (key, value) in entries {
            batch.insert(key.as_bytes(), value.as_bytes());
        }
        self.tree.apply_batch(batch)?;
        self.tree.flush()?;
        Ok(())
    }

    /// Remove several entries atomically. Missing keys are not an error.
    pub fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut batch = sled::Batch::default();
        for key in keys {
            batch.remove(key.as_bytes());
        }
        self.tree.apply_batch(batch)?;
        self.tree.flush()?;
        Ok(())
    }

    /// Every entry in this namespace, sorted by key.
    pub fn snapshot(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let mut entries = BTreeMap::new();
        for item in self.tree.iter() {
            let (key, value) = item?;
            entries.insert(
                String::from_utf8_lossy(&key).into_owned(),
                String::from_utf8_lossy(&value).into_owned(),
            );
        }
        Ok(entries)
    }
}
