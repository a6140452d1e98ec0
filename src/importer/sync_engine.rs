// ==========================================
// Logistics Sync - sync engine implementation
// ==========================================
// One pipeline invocation end to end, a single logical pass:
// decode -> read -> resolve schema -> normalize -> reconcile
// -> batched writes. Six record kinds instantiate this one
// engine with their profiles; nothing here is kind-specific.
// ==========================================

use crate::domain::{
    ComparePolicy, FieldValue, LogicalRecord, RecordKind, RecordWrite, RunMode, RunReport,
};
use crate::importer::batch_writer::BatchWriter;
use crate::importer::encoding::decode_extract;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::identity_index::IdentityIndex;
use crate::importer::normalizer::{normalize_row, RowOutcome};
use crate::importer::profiles::{profile_for, KindProfile};
use crate::importer::reconciler::{Classification, Reconciler};
use crate::importer::record_reader::DelimitedReader;
use crate::importer::schema::resolve_columns;
use crate::repository::{CounterpartyRepository, SyncRecordRepository};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// EngineOptions - tuning knobs
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Flush threshold for create/update buffers and the chunk
    /// size for bulk deletes.
    pub batch_size: usize,
    /// Identity index load page size.
    pub page_size: usize,
    /// In-flight cap for individual update writes.
    pub update_concurrency: usize,
    /// Trailing window for windowed runs, in days.
    pub window_days: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            batch_size: 500,
            page_size: 1000,
            update_concurrency: 50,
            window_days: 90,
        }
    }
}

// ==========================================
// RunFailure - fatal error plus partial counters
// ==========================================
// The coordinator persists whatever partial report exists
// before re-raising the error.
#[derive(Debug)]
pub struct RunFailure {
    pub error: ImportError,
    pub partial: RunReport,
}

// ==========================================
// SyncEngine Trait
// ==========================================
#[async_trait]
pub trait SyncEngine: Send + Sync {
    /// Run one import-and-reconciliation pass for a kind.
    async fn run(
        &self,
        kind: RecordKind,
        source: &Path,
        mode: RunMode,
    ) -> Result<RunReport, RunFailure>;
}

// ==========================================
// SyncEngineImpl
// ==========================================
pub struct SyncEngineImpl<R, C>
where
    R: SyncRecordRepository,
    C: CounterpartyRepository,
{
    record_repo: R,
    counterparty_repo: C,
    options: EngineOptions,
}

impl<R, C> SyncEngineImpl<R, C>
where
    R: SyncRecordRepository,
    C: CounterpartyRepository,
{
    pub fn new(record_repo: R, counterparty_repo: C, options: EngineOptions) -> Self {
        Self {
            record_repo,
            counterparty_repo,
            options,
        }
    }

    fn window_start(&self, profile: &KindProfile, mode: RunMode) -> Option<NaiveDate> {
        if !mode.is_windowed() {
            return None;
        }
        // kinds without a document date load everything even
        // when windowed; only removal suppression applies
        profile.date_field?;
        chrono::Local::now()
            .date_naive()
            .checked_sub_days(Days::new(self.options.window_days))
    }

    fn record_write(&self, profile: &KindProfile, record: &LogicalRecord) -> Option<RecordWrite> {
        let payload = match record.payload_json() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(row = record.row_number, error = %e, "payload serialization failed");
                return None;
            }
        };

        let doc_date = profile
            .date_field
            .and_then(|f| record.field(f))
            .and_then(FieldValue::as_date)
            .map(|dt| dt.date());

        let compare_value = match profile.compare_policy {
            ComparePolicy::SkipIfUnchanged { field } => {
                record.field(field).map(|v| v.canonical())
            }
            ComparePolicy::AlwaysWrite => None,
        };

        Some(RecordWrite {
            kind: profile.kind,
            key: record.key.clone(),
            doc_date,
            compare_value,
            payload,
        })
    }

    async fn run_inner(
        &self,
        kind: RecordKind,
        source: &Path,
        mode: RunMode,
        report: &mut RunReport,
    ) -> ImportResult<()> {
        let profile = profile_for(kind);

        // step 1: read and decode the extract
        let bytes = tokio::fs::read(source).await?;
        let text = decode_extract(&bytes, profile.header_tokens);
        debug!(bytes = bytes.len(), "extract decoded");

        // step 2: header row and schema resolution
        let mut reader = DelimitedReader::from_text(text)?;
        let columns = resolve_columns(kind, profile.fields, reader.headers())?;

        // step 3: reference data, once per run
        let valid_tins = if profile.referential_field.is_some() {
            self.counterparty_repo.load_valid_tins().await?
        } else {
            HashSet::new()
        };
        debug!(tins = valid_tins.len(), "reference set loaded");

        // step 4: identity index, paged
        let index = IdentityIndex::load(
            &self.record_repo,
            kind,
            self.window_start(profile, mode),
            self.options.page_size,
        )
        .await?;
        info!(entries = index.len(), "identity index ready");

        // step 5: stream, classify, stage writes
        let mut reconciler = Reconciler::new(index, profile.compare_policy);
        let mut writer = BatchWriter::new(
            &self.record_repo,
            kind,
            self.options.batch_size,
            self.options.update_concurrency,
        );

        while let Some(item) = reader.next() {
            let row = match item {
                Ok(row) => row,
                Err(e) => {
                    report.record_skip(reader.current_row(), format!("malformed row: {}", e));
                    continue;
                }
            };

            let record = match normalize_row(profile, &columns, &row, &valid_tins) {
                RowOutcome::Accepted(record) => record,
                RowOutcome::Rejected { row_number, reason } => {
                    report.record_skip(row_number, reason);
                    continue;
                }
            };

            let Some(write) = self.record_write(profile, &record) else {
                report.errors += 1;
                continue;
            };

            match reconciler.classify(&record) {
                Classification::Create => writer.stage_create(write).await?,
                Classification::Update { id } => writer.stage_update(id, write).await?,
                Classification::Unchanged { .. } => {}
            }
        }

        // step 6: removal set, full sync only
        let removals = reconciler.removal_ids(mode);
        debug!(
            observed = reconciler.observed_count(),
            removals = removals.len(),
            "stream exhausted"
        );
        writer.delete_ids(removals).await?;

        // step 7: final flush
        let totals = writer.finish().await?;
        report.created = totals.created;
        report.updated = totals.updated;
        report.deleted = totals.deleted;
        report.errors += totals.errors;

        Ok(())
    }
}

#[async_trait]
impl<R, C> SyncEngine for SyncEngineImpl<R, C>
where
    R: SyncRecordRepository,
    C: CounterpartyRepository,
{
    #[instrument(skip(self, source), fields(kind = %kind, run_id = %Uuid::new_v4()))]
    async fn run(
        &self,
        kind: RecordKind,
        source: &Path,
        mode: RunMode,
    ) -> Result<RunReport, RunFailure> {
        let started = Instant::now();
        info!(source = %source.display(), ?mode, "import run started");

        let mut report = RunReport::new(kind);
        match self.run_inner(kind, source, mode, &mut report).await {
            Ok(()) => {
                report.elapsed = started.elapsed();
                info!(
                    created = report.created,
                    updated = report.updated,
                    deleted = report.deleted,
                    skipped = report.skipped,
                    errors = report.errors,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "import run finished"
                );
                Ok(report)
            }
            Err(err) => {
                report.elapsed = started.elapsed();
                error!(error = %err, "import run aborted");
                Err(RunFailure {
                    error: err,
                    partial: report,
                })
            }
        }
    }
}
