//! Local key-value storage.
//!
//! # Responsibility
//! - Persist small string documents (medication list, preferences) under
//!   fixed keys.
//!
//! # Invariants
//! - `put` replaces the whole value for a key.
//! - Reads of unknown keys return `None`.

use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

/// String key-value storage contract.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> RepoResult<()>;
    fn remove(&self, key: &str) -> RepoResult<()>;
}

/// SQLite-backed key-value store over the `kv_store` table.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, SqliteKeyValueStore};
    use crate::db::open_db_in_memory;

    #[test]
    fn put_replaces_and_remove_clears() {
        let store = SqliteKeyValueStore::new(open_db_in_memory().expect("open db"));
        assert_eq!(store.get("k").expect("get"), None);

        store.put("k", "one").expect("put");
        store.put("k", "two").expect("overwrite");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("two"));

        store.remove("k").expect("remove");
        assert_eq!(store.get("k").expect("get"), None);
    }
}
