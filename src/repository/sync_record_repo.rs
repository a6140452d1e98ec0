// ==========================================
// Logistics Sync - sync record Repository Trait
// ==========================================
// The store contract the engine consumes: paged key
// projection, duplicate-tolerant bulk upsert, update by id,
// bulk delete by id set, count. Repositories do data access
// only; no business rules here.
// ==========================================

use crate::domain::{KeyProjection, RecordKind, RecordWrite};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::NaiveDate;

// ==========================================
// SyncRecordRepository Trait
// ==========================================
// Implementor: SyncRecordRepositoryImpl (rusqlite)
#[async_trait]
pub trait SyncRecordRepository: Send + Sync {
    /// Load one page of key projections for a kind.
    ///
    /// Projects only id, business key and the compare value;
    /// `min_doc_date` restricts the load to a trailing window
    /// on windowed runs (kinds without a document date pass
    /// `None` and load everything).
    async fn list_keys_page(
        &self,
        kind: RecordKind,
        min_doc_date: Option<NaiveDate>,
        limit: usize,
        offset: usize,
    ) -> RepositoryResult<Vec<KeyProjection>>;

    /// Bulk upsert on (kind, business_key).
    ///
    /// Duplicate-tolerant: a key that already exists (a race
    /// with a concurrent run, or a repeated key later in the
    /// same extract) overwrites instead of erroring, so the
    /// later row always wins.
    ///
    /// Returns the number of rows written. The whole batch is
    /// one transaction.
    async fn insert_many(&self, records: Vec<RecordWrite>) -> RepositoryResult<usize>;

    /// Update one stored record by its store id.
    async fn update_by_id(&self, id: i64, record: RecordWrite) -> RepositoryResult<()>;

    /// Delete stored records of a kind by id set.
    ///
    /// Returns the number of rows actually deleted.
    async fn delete_by_ids(&self, kind: RecordKind, ids: &[i64]) -> RepositoryResult<usize>;

    /// Count stored records of a kind.
    async fn count(&self, kind: RecordKind) -> RepositoryResult<usize>;

    /// Fetch one stored record by business key.
    ///
    /// Not used by the engine itself; serves the read side and
    /// the integration tests.
    async fn find_by_key(
        &self,
        kind: RecordKind,
        key: &crate::domain::BusinessKey,
    ) -> RepositoryResult<Option<(i64, String)>>;
}
