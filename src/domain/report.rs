// ==========================================
// Logistics Sync - run reporting entities
// ==========================================
// Per-run counters plus the persisted snapshot row
// (one row per record kind, overwritten each run)
// ==========================================

use crate::domain::types::RecordKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

// ==========================================
// SkipReason - one rejected row
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipReason {
    pub row_number: usize,
    pub reason: String,
}

// ==========================================
// RunReport - counters for one pipeline run
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub kind: RecordKind,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub errors: usize,
    /// First `MAX_SKIP_REASONS` rejection reasons, for reporting.
    pub skip_reasons: Vec<SkipReason>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunReport {
    /// Cap on retained rejection reasons; skips beyond the cap
    /// are still counted.
    pub const MAX_SKIP_REASONS: usize = 50;

    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            created: 0,
            updated: 0,
            deleted: 0,
            skipped: 0,
            errors: 0,
            skip_reasons: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn record_skip(&mut self, row_number: usize, reason: impl Into<String>) {
        self.skipped += 1;
        if self.skip_reasons.len() < Self::MAX_SKIP_REASONS {
            self.skip_reasons.push(SkipReason {
                row_number,
                reason: reason.into(),
            });
        }
    }
}

// ==========================================
// ImportMeta - persisted run snapshot
// ==========================================
// One row per record kind in the import_meta table,
// upserted at the end of every run, success or failure.
// A snapshot, not a history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportMeta {
    pub kind: RecordKind,
    pub last_run_at: DateTime<Utc>,
    pub created: i64,
    pub updated: i64,
    pub deleted: i64,
    pub skipped: i64,
    pub errors: i64,
}

impl ImportMeta {
    pub fn from_report(report: &RunReport, last_run_at: DateTime<Utc>) -> Self {
        Self {
            kind: report.kind,
            last_run_at,
            created: report.created as i64,
            updated: report.updated as i64,
            deleted: report.deleted as i64,
            skipped: report.skipped as i64,
            errors: report.errors as i64,
        }
    }
}
