//! SQLite-backed instance table.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::types::Instance;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS instances (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        ip TEXT
    )
";

pub struct InstanceStore {
    conn: Mutex<Connection>,
}

impl InstanceStore {
    /// Open (or create) the database file and make sure the table exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(CREATE_TABLE)?;
        info!("instance store opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn list(&self) -> Result<Vec<Instance>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, ip FROM instances ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Instance {
                id: row.get(0)?,
                name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                ip: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?;
        let instances = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(instances)
    }

    pub fn create(&self, name: &str, ip: &str) -> Result<Instance, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO instances (name, ip) VALUES (?1, ?2)",
            params![name, ip],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, name, ip, "instance created");
        Ok(Instance {
            id,
            name: name.to_string(),
            ip: ip.to_string(),
        })
    }

    /// Delete by id. Returns whether a row was removed; a missing id is not an error.
    pub fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let n = conn.execute("DELETE FROM instances WHERE id = ?1", params![id])?;
        debug!(id, removed = n, "instance delete");
        Ok(n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_list_delete_round_trip() {
        let store = InstanceStore::open_in_memory().unwrap();
        let created = store.create("a", "1.2.3.4").unwrap();
        let all = store.list().unwrap();
        assert!(all
            .iter()
            .any(|i| i.id == created.id && i.name == "a" && i.ip == "1.2.3.4"));

        assert!(store.delete(created.id).unwrap());
        assert!(store.list().unwrap().iter().all(|i| i.id != created.id));
    }

    #[test]
    fn delete_missing_is_noop() {
        let store = InstanceStore::open_in_memory().unwrap();
        assert!(!store.delete(9999).unwrap());
    }

    #[test]
    fn ids_are_fresh_and_ordered() {
        let store = InstanceStore::open_in_memory().unwrap();
        let a = store.create("web", "10.0.0.1").unwrap();
        let b = store.create("web", "10.0.0.1").unwrap();
        assert!(b.id > a.id);
        store.delete(b.id).unwrap();
        let c = store.create("db", "10.0.0.2").unwrap();
        // AUTOINCREMENT never reuses a deleted id
        assert!(c.id > b.id);
        let ids: Vec<i64> = store.list().unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[test]
    fn open_on_existing_file_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");
        {
            let store = InstanceStore::open(&path).unwrap();
            store.create("a", "1.1.1.1").unwrap();
        }
        let store = InstanceStore::open(&path).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
