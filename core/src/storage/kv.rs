use super::{Connection, Database, KvRepository};
use crate::{Error, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Durable named-slot storage the mood store writes through to.
pub trait KeyValueStore {
    /// Read a slot, `None` if it was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the contents of a slot
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Slots kept in the `kv_store` table of a SQLite file
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (or create) the database file and wrap its connection
    pub fn open(db: &Database) -> Result<Self> {
        Ok(Self::new(db.get_or_create()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        KvRepository::get(&self.conn, key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        KvRepository::set(&self.conn, key, value)
    }
}

/// In-memory slots for tests. Clones share the same slots, so a second
/// store opened on a clone sees what the first one flushed.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slots: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, as a full or unavailable medium would
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Raw slot contents
    pub fn slot(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }

    /// Write a slot directly, bypassing the failure switch
    pub fn seed(&self, key: &str, value: &str) {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.get() {
            return Err(Error::Storage("storage quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slot(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.seed(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sqlite_store_roundtrip() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db"));
        let mut store = SqliteStore::open(&db).unwrap();

        assert_eq!(store.get("moods").unwrap(), None);
        store.set("moods", "[]").unwrap();
        assert_eq!(store.get("moods").unwrap().as_deref(), Some("[]"));

        store.set("moods", "[1]").unwrap();
        assert_eq!(store.get("moods").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db"));

        {
            let mut store = SqliteStore::open(&db).unwrap();
            store.set("moods", "[\"kept\"]").unwrap();
        }

        let store = SqliteStore::open(&db).unwrap();
        assert_eq!(store.get("moods").unwrap().as_deref(), Some("[\"kept\"]"));
    }

    #[test]
    fn test_memory_store_shares_slots() {
        let mut a = MemoryStore::new();
        let b = a.clone();
        a.set("moods", "[]").unwrap();
        assert_eq!(b.get("moods").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_store_failing_writes() {
        let mut store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(matches!(store.set("moods", "[]"), Err(Error::Storage(_))));
        assert_eq!(store.slot("moods"), None);
    }
}
