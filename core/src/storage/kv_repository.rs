use crate::Result;
use rusqlite::{params, Connection, OptionalExtension};

pub struct KvRepository;

impl KvRepository {
    /// Read a slot, `None` if it was never written
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    /// Write a slot, replacing any previous value
    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use tempfile::tempdir;

    fn setup_test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::new(&db_path);
        let conn = db.create().unwrap();
        (dir, conn)
    }

    #[test]
    fn test_missing_slot() {
        let (_dir, conn) = setup_test_db();
        assert_eq!(KvRepository::get(&conn, "moods").unwrap(), None);
    }

    #[test]
    fn test_set_and_overwrite() {
        let (_dir, conn) = setup_test_db();

        KvRepository::set(&conn, "moods", "[]").unwrap();
        assert_eq!(KvRepository::get(&conn, "moods").unwrap().as_deref(), Some("[]"));

        KvRepository::set(&conn, "moods", "[1]").unwrap();
        assert_eq!(KvRepository::get(&conn, "moods").unwrap().as_deref(), Some("[1]"));
    }
}
