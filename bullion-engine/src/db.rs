use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{Connection, Transaction};

use crate::store;
use crate::{EngineError, EngineResult};

/// Shared handle over the single SQLite database. One posting run holds the
/// connection for its whole session, so concurrent transactions on the same
/// party or SKU serialise on the write lock.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|err| EngineError::Internal(format!("create db dir: {err}")))?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> EngineResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> EngineResult<Self> {
        store::schema::init(&conn)?;
        bullion_ledger::sqlite::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` inside one database transaction. Commit on `Ok`; any error
    /// rolls the whole session back, leaving zero effect.
    pub fn with_session<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Read-only access outside any session.
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> EngineResult<T>) -> EngineResult<T> {
        let conn = self.conn.lock();
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_rolls_back_on_error() {
        let db = Db::open_in_memory().unwrap();
        let result: EngineResult<()> = db.with_session(|tx| {
            tx.execute(
                "INSERT INTO deal_orders (id, status) VALUES ('D1', 'open')",
                [],
            )?;
            Err(EngineError::Internal("abort".into()))
        });
        assert!(result.is_err());
        let count = db
            .read(|conn| {
                Ok(conn
                    .query_row("SELECT COUNT(*) FROM deal_orders", [], |row| {
                        row.get::<_, i64>(0)
                    })
                    .unwrap())
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn session_commits_on_ok() {
        let db = Db::open_in_memory().unwrap();
        db.with_session(|tx| {
            tx.execute(
                "INSERT INTO deal_orders (id, status) VALUES ('D1', 'open')",
                [],
            )?;
            Ok(())
        })
        .unwrap();
        let count = db
            .read(|conn| {
                Ok(conn
                    .query_row("SELECT COUNT(*) FROM deal_orders", [], |row| {
                        row.get::<_, i64>(0)
                    })
                    .unwrap())
            })
            .unwrap();
        assert_eq!(count, 1);
    }
}
