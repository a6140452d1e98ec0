// ==========================================
// Logistics Sync - sync record Repository impl
// ==========================================
// rusqlite implementation over the sync_record table.
// Batched writes run inside one transaction; IN-set
// statements are built with parameter placeholders only.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{BusinessKey, KeyProjection, RecordKind, RecordWrite};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sync_record_repo::SyncRecordRepository;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// SyncRecordRepositoryImpl
// ==========================================
pub struct SyncRecordRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl SyncRecordRepositoryImpl {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an already configured connection.
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
impl SyncRecordRepository for SyncRecordRepositoryImpl {
    async fn list_keys_page(
        &self,
        kind: RecordKind,
        min_doc_date: Option<NaiveDate>,
        limit: usize,
        offset: usize,
    ) -> RepositoryResult<Vec<KeyProjection>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, business_key, compare_value
            FROM sync_record
            WHERE kind = ?1
              AND (?2 IS NULL OR doc_date >= ?2)
            ORDER BY id
            LIMIT ?3 OFFSET ?4
            "#,
        )?;

        let rows = stmt.query_map(
            params![kind.as_str(), min_doc_date, limit as i64, offset as i64],
            |row| {
                Ok(KeyProjection {
                    id: row.get(0)?,
                    key: BusinessKey::from_joined(row.get::<_, String>(1)?),
                    compare_value: row.get(2)?,
                })
            },
        )?;

        let mut projections = Vec::new();
        for row in rows {
            projections.push(row?);
        }
        Ok(projections)
    }

    async fn insert_many(&self, records: Vec<RecordWrite>) -> RepositoryResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;

        let now = Utc::now();
        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO sync_record (
                    kind, business_key, doc_date, compare_value, payload,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                ON CONFLICT (kind, business_key) DO UPDATE SET
                    doc_date = excluded.doc_date,
                    compare_value = excluded.compare_value,
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
                "#,
            )?;

            for record in &records {
                stmt.execute(params![
                    record.kind.as_str(),
                    record.key.as_str(),
                    record.doc_date,
                    record.compare_value,
                    record.payload,
                    now,
                ])?;
                count += 1;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn update_by_id(&self, id: i64, record: RecordWrite) -> RepositoryResult<()> {
        let conn = self.lock()?;

        let changed = conn.execute(
            r#"
            UPDATE sync_record
            SET doc_date = ?2, compare_value = ?3, payload = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
            params![
                id,
                record.doc_date,
                record.compare_value,
                record.payload,
                Utc::now(),
            ],
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "sync_record".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete_by_ids(&self, kind: RecordKind, ids: &[i64]) -> RepositoryResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.lock()?;

        let placeholders = (2..ids.len() + 2)
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "DELETE FROM sync_record WHERE kind = ?1 AND id IN ({})",
            placeholders
        );

        let mut stmt = conn.prepare(&sql)?;
        let deleted = stmt.execute(params_from_iter(
            std::iter::once(rusqlite::types::Value::from(kind.as_str().to_string()))
                .chain(ids.iter().map(|id| rusqlite::types::Value::from(*id))),
        ))?;

        Ok(deleted)
    }

    async fn count(&self, kind: RecordKind) -> RepositoryResult<usize> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sync_record WHERE kind = ?1",
            params![kind.as_str()],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }

    async fn find_by_key(
        &self,
        kind: RecordKind,
        key: &BusinessKey,
    ) -> RepositoryResult<Option<(i64, String)>> {
        let conn = self.lock()?;

        let result = conn.query_row(
            "SELECT id, payload FROM sync_record WHERE kind = ?1 AND business_key = ?2",
            params![kind.as_str(), key.as_str()],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        );

        match result {
            Ok(found) => Ok(Some(found)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
