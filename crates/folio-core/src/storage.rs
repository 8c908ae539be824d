//! Preference persistence.
//!
//! The page persists exactly one browser-local flag (the theme). The engine
//! sees it through [`PreferenceStore`]; hosts inject either the in-memory
//! store or the redb-backed one.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use redb::{Database, ReadableTable, TableDefinition};

use crate::error::FolioResult;

const PREFERENCES_TABLE: TableDefinition<&str, &str> = TableDefinition::new("preferences");

/// Key-value slot storage surviving page reloads
pub trait PreferenceStore {
    fn get(&self, key: &str) -> FolioResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> FolioResult<()>;
    fn remove(&mut self, key: &str) -> FolioResult<()>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn get(&self, key: &str) -> FolioResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> FolioResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> FolioResult<()> {
        (**self).remove(key)
    }
}

/// Non-persistent store for tests and one-off replays
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one entry
    pub fn with(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> FolioResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> FolioResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> FolioResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Preference store using redb for ACID-compliant persistence
#[derive(Clone)]
pub struct RedbPreferences {
    db: Arc<RwLock<Database>>,
}

impl RedbPreferences {
    /// Open or create the preference database at `path`.
    ///
    /// Creates the parent directory and the preferences table if missing.
    pub fn open(path: impl AsRef<Path>) -> FolioResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PREFERENCES_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
        })
    }
}

impl PreferenceStore for RedbPreferences {
    fn get(&self, key: &str) -> FolioResult<Option<String>> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(PREFERENCES_TABLE)?;
        let value = table.get(key)?.map(|v| v.value().to_string());
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> FolioResult<()> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(PREFERENCES_TABLE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> FolioResult<()> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(PREFERENCES_TABLE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
