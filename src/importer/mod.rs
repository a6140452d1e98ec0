// ==========================================
// Logistics Sync - import pipeline modules
// ==========================================
// One generic pipeline serves all record kinds; the per-kind
// differences live entirely in `profiles`. Stages, in pass
// order: encoding -> record_reader -> schema -> normalizer ->
// identity_index -> reconciler -> batch_writer, orchestrated
// by sync_engine behind run_coordinator's per-kind guard.
// ==========================================

pub mod batch_writer;
pub mod encoding;
pub mod error;
pub mod identity_index;
pub mod normalizer;
pub mod profiles;
pub mod reconciler;
pub mod record_reader;
pub mod run_coordinator;
pub mod schema;
pub mod sync_engine;

pub use batch_writer::{BatchWriter, WriteTotals};
pub use encoding::decode_extract;
pub use error::{ImportError, ImportResult};
pub use identity_index::IdentityIndex;
pub use normalizer::{normalize_row, RowOutcome};
pub use profiles::{profile_for, KindProfile};
pub use reconciler::{Classification, Reconciler};
pub use record_reader::{DelimitedReader, ExtractRow};
pub use run_coordinator::{RunCoordinator, RunOutcome};
pub use schema::{resolve_columns, ColumnMap, FieldSpec};
pub use sync_engine::{EngineOptions, RunFailure, SyncEngine, SyncEngineImpl};
