// ==========================================
// Logistics Sync - import metadata Repository
// ==========================================
// One import_meta row per record kind: last-run timestamp
// plus the five counters. Upserted at the end of every run,
// success or failure. A snapshot, not a history.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{ImportMeta, RecordKind};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ImportMetaRepository Trait
// ==========================================
#[async_trait]
pub trait ImportMetaRepository: Send + Sync {
    /// Create-if-absent, else overwrite the kind's snapshot row.
    async fn upsert(&self, meta: ImportMeta) -> RepositoryResult<()>;

    /// Read the kind's snapshot row, if any run ever completed.
    async fn get(&self, kind: RecordKind) -> RepositoryResult<Option<ImportMeta>>;
}

// ==========================================
// ImportMetaRepositoryImpl
// ==========================================
pub struct ImportMetaRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ImportMetaRepositoryImpl {
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
impl ImportMetaRepository for ImportMetaRepositoryImpl {
    async fn upsert(&self, meta: ImportMeta) -> RepositoryResult<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO import_meta (
                kind, last_run_at, created, updated, deleted, skipped, errors
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (kind) DO UPDATE SET
                last_run_at = excluded.last_run_at,
                created = excluded.created,
                updated = excluded.updated,
                deleted = excluded.deleted,
                skipped = excluded.skipped,
                errors = excluded.errors
            "#,
            params![
                meta.kind.as_str(),
                meta.last_run_at,
                meta.created,
                meta.updated,
                meta.deleted,
                meta.skipped,
                meta.errors,
            ],
        )?;

        Ok(())
    }

    async fn get(&self, kind: RecordKind) -> RepositoryResult<Option<ImportMeta>> {
        let conn = self.lock()?;

        let result = conn.query_row(
            r#"
            SELECT last_run_at, created, updated, deleted, skipped, errors
            FROM import_meta
            WHERE kind = ?1
            "#,
            params![kind.as_str()],
            |row| {
                Ok(ImportMeta {
                    kind,
                    last_run_at: row.get::<_, DateTime<Utc>>(0)?,
                    created: row.get(1)?,
                    updated: row.get(2)?,
                    deleted: row.get(3)?,
                    skipped: row.get(4)?,
                    errors: row.get(5)?,
                })
            },
        );

        match result {
            Ok(meta) => Ok(Some(meta)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
