// ==========================================
// Logistics Sync - counterparty reference Repository
// ==========================================
// The owning-party identifier reference set: small table,
// loaded once per run for the referential row check.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// CounterpartyRepository Trait
// ==========================================
#[async_trait]
pub trait CounterpartyRepository: Send + Sync {
    /// Load the full set of valid owning-party identifiers.
    async fn load_valid_tins(&self) -> RepositoryResult<HashSet<String>>;

    /// Insert reference rows (tin, name), replacing existing ones.
    async fn insert_many(&self, counterparties: Vec<(String, String)>) -> RepositoryResult<usize>;
}

// ==========================================
// CounterpartyRepositoryImpl
// ==========================================
pub struct CounterpartyRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CounterpartyRepositoryImpl {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl CounterpartyRepository for CounterpartyRepositoryImpl {
    async fn load_valid_tins(&self) -> RepositoryResult<HashSet<String>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT tin FROM counterparty")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut tins = HashSet::new();
        for row in rows {
            tins.insert(row?);
        }
        Ok(tins)
    }

    async fn insert_many(&self, counterparties: Vec<(String, String)>) -> RepositoryResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;

        let mut count = 0;
        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO counterparty (tin, name) VALUES (?1, ?2)")?;
            for (tin, name) in &counterparties {
                stmt.execute(params![tin, name])?;
                count += 1;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;
        Ok(count)
    }
}
