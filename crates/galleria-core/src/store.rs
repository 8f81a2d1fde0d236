//! Key-value persistence substrate (the browser's local storage, in Rust).

use std::collections::HashMap;
use std::sync::RwLock;

pub trait KvStore: Send + Sync {
    fn init(&self) -> anyhow::Result<()> {
        Ok(())
    }
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove_item(&self, key: &str) -> anyhow::Result<()>;
    fn keys(&self) -> anyhow::Result<Vec<String>>;
}

impl<T: KvStore + ?Sized> KvStore for std::sync::Arc<T> {
    fn init(&self) -> anyhow::Result<()> {
        (**self).init()
    }
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        (**self).get_item(key)
    }
    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        (**self).set_item(key, value)
    }
    fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        (**self).remove_item(key)
    }
    fn keys(&self) -> anyhow::Result<Vec<String>> {
        (**self).keys()
    }
}

/// In-memory store. An optional byte quota makes writes fail the way a
/// full browser storage area does.
#[derive(Default)]
pub struct MemStore {
    inner: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(bytes: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            quota: Some(bytes),
        }
    }
}

impl KvStore for MemStore {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        let m = self.inner.read().expect("poisoned");
        Ok(m.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut m = self.inner.write().expect("poisoned");
        if let Some(quota) = self.quota {
            let used: usize = m
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                anyhow::bail!("storage quota exceeded writing {}", key);
            }
        }
        m.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        self.inner.write().expect("poisoned").remove(key);
        Ok(())
    }

    fn keys(&self) -> anyhow::Result<Vec<String>> {
        let m = self.inner.read().expect("poisoned");
        let mut keys: Vec<String> = m.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(feature = "sqlite")]
mod sqlite_store {
    use super::KvStore;
    use rusqlite::{params, Connection, OptionalExtension};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
        key   TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    );";

    /// SQLite-backed store; one row per key.
    pub struct SqliteStore {
        path: PathBuf,
        conn: Mutex<Connection>,
    }

    impl SqliteStore {
        pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
            let path = path.as_ref().to_path_buf();
            let conn = Connection::open(&path)?;
            let _ = conn.pragma_update(None, "journal_mode", "WAL");
            let _ = conn.busy_timeout(std::time::Duration::from_millis(5000));
            let store = Self {
                path,
                conn: Mutex::new(conn),
            };
            store.init()?;
            Ok(store)
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl KvStore for SqliteStore {
        fn init(&self) -> anyhow::Result<()> {
            let conn = self.conn.lock().unwrap();
            conn.execute_batch(SCHEMA)?;
            Ok(())
        }

        fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
            let conn = self.conn.lock().unwrap();
            let v = conn
                .query_row("SELECT value FROM kv WHERE key = ?", [key], |r| {
                    r.get::<_, String>(0)
                })
                .optional()?;
            Ok(v)
        }

        fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO kv(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        }

        fn remove_item(&self, key: &str) -> anyhow::Result<()> {
            let conn = self.conn.lock().unwrap();
            conn.execute("DELETE FROM kv WHERE key = ?", params![key])?;
            Ok(())
        }

        fn keys(&self) -> anyhow::Result<Vec<String>> {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
            let mut rows = stmt.query([])?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                out.push(row.get(0)?);
            }
            Ok(out)
        }
    }

    pub use SqliteStore as StoreImpl;
}

#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteStore;

#[cfg(not(feature = "sqlite"))]
mod sqlite_store {
    pub use super::MemStore as StoreImpl;
}

pub use sqlite_store::StoreImpl;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_store_crud() {
        let s = MemStore::new();
        assert_eq!(s.get_item("k").unwrap(), None);
        s.set_item("k", "v").unwrap();
        s.set_item("k", "w").unwrap();
        assert_eq!(s.get_item("k").unwrap().as_deref(), Some("w"));
        s.remove_item("k").unwrap();
        assert!(s.keys().unwrap().is_empty());
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_old_value() {
        let s = MemStore::with_quota(16);
        s.set_item("a", "1234").unwrap();
        assert!(s.set_item("a", "x".repeat(64).as_str()).is_err());
        assert_eq!(s.get_item("a").unwrap().as_deref(), Some("1234"));
    }
}
