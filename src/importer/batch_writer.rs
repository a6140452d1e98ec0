// ==========================================
// Logistics Sync - batch writer
// ==========================================
// Buffers creates and updates separately, flushing at the
// configured batch size or at end of stream. Creates go out
// as one duplicate-tolerant bulk upsert; updates fan out
// individually with bounded concurrency; deletions are
// chunked bulk delete-by-id-set calls.
//
// One failing item increments the error counter and never
// aborts the batch or the run. Failure to reach the store at
// all is fatal.
// ==========================================

use crate::domain::{BusinessKey, RecordKind, RecordWrite};
use crate::importer::error::ImportResult;
use crate::repository::SyncRecordRepository;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::warn;

// ==========================================
// WriteTotals - counters for one run's writes
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteTotals {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub errors: usize,
}

// ==========================================
// BatchWriter
// ==========================================
pub struct BatchWriter<'a> {
    repo: &'a dyn SyncRecordRepository,
    kind: RecordKind,
    batch_size: usize,
    update_concurrency: usize,
    creates: Vec<RecordWrite>,
    updates: Vec<(i64, RecordWrite)>,
    totals: WriteTotals,
}

impl<'a> BatchWriter<'a> {
    pub fn new(
        repo: &'a dyn SyncRecordRepository,
        kind: RecordKind,
        batch_size: usize,
        update_concurrency: usize,
    ) -> Self {
        Self {
            repo,
            kind,
            batch_size,
            update_concurrency,
            creates: Vec::new(),
            updates: Vec::new(),
            totals: WriteTotals::default(),
        }
    }

    pub async fn stage_create(&mut self, record: RecordWrite) -> ImportResult<()> {
        self.creates.push(record);
        if self.creates.len() >= self.batch_size {
            self.flush_creates().await?;
        }
        Ok(())
    }

    pub async fn stage_update(&mut self, id: i64, record: RecordWrite) -> ImportResult<()> {
        self.updates.push((id, record));
        if self.updates.len() >= self.batch_size {
            self.flush_updates().await?;
        }
        Ok(())
    }

    /// Delete the removal set, chunked to the batch size.
    pub async fn delete_ids(&mut self, ids: Vec<i64>) -> ImportResult<()> {
        for chunk in ids.chunks(self.batch_size) {
            match self.repo.delete_by_ids(self.kind, chunk).await {
                Ok(deleted) => self.totals.deleted += deleted,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!(kind = %self.kind, error = %e, "delete chunk failed");
                    self.totals.errors += chunk.len();
                }
            }
        }
        Ok(())
    }

    /// Flush both buffers and return the totals.
    pub async fn finish(mut self) -> ImportResult<WriteTotals> {
        self.flush_creates().await?;
        self.flush_updates().await?;
        Ok(self.totals)
    }

    async fn flush_creates(&mut self) -> ImportResult<()> {
        if self.creates.is_empty() {
            return Ok(());
        }

        // a business key repeated within the flush is one row
        // in the store and must count as one create
        let mut by_key: HashMap<BusinessKey, RecordWrite> = HashMap::new();
        for record in self.creates.drain(..) {
            by_key.insert(record.key.clone(), record);
        }
        let batch: Vec<RecordWrite> = by_key.into_values().collect();
        let batch_len = batch.len();

        match self.repo.insert_many(batch).await {
            Ok(written) => self.totals.created += written,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(kind = %self.kind, error = %e, "create batch failed");
                self.totals.errors += batch_len;
            }
        }
        Ok(())
    }

    async fn flush_updates(&mut self) -> ImportResult<()> {
        if self.updates.is_empty() {
            return Ok(());
        }

        // a key repeated later in the extract wins within the
        // flush; updates to one id must not race each other
        let mut by_id: HashMap<i64, RecordWrite> = HashMap::new();
        for (id, record) in self.updates.drain(..) {
            by_id.insert(id, record);
        }

        let repo = self.repo;
        let results: Vec<(i64, crate::repository::RepositoryResult<()>)> =
            stream::iter(by_id.into_iter().map(|(id, record)| async move {
                (id, repo.update_by_id(id, record).await)
            }))
            .buffer_unordered(self.update_concurrency)
            .collect()
            .await;

        for (id, result) in results {
            match result {
                Ok(()) => self.totals.updated += 1,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!(kind = %self.kind, id, error = %e, "update failed");
                    self.totals.errors += 1;
                }
            }
        }
        Ok(())
    }
}
