// ==========================================
// Logistics Sync - core library
// ==========================================
// Streaming file-extract import and reconciliation engine
// for a logistics back office. Six record kinds flow through
// one generic pipeline; SQLite is the system of record.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Import layer - extract ingestion and reconciliation
pub mod importer;

// Database infrastructure (connection init / unified PRAGMAs)
pub mod db;

// Logging system
pub mod logging;

// ==========================================
// Core type re-exports
// ==========================================

// Domain types
pub use domain::{
    BusinessKey, ComparePolicy, FieldType, FieldValue, ImportMeta, KeyProjection, LogicalRecord,
    RecordKind, RecordWrite, RunMode, RunReport, RunState, SkipReason,
};

// Repositories
pub use repository::{
    CounterpartyRepository, CounterpartyRepositoryImpl, ImportMetaRepository,
    ImportMetaRepositoryImpl, RepositoryError, RepositoryResult, SyncRecordRepository,
    SyncRecordRepositoryImpl,
};

// Import pipeline
pub use importer::{
    EngineOptions, ImportError, ImportResult, RunCoordinator, RunFailure, RunOutcome, SyncEngine,
    SyncEngineImpl,
};

// ==========================================
// Constants
// ==========================================

// System version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// System name
pub const APP_NAME: &str = "Logistics Sync";

// ==========================================
// Compile-time visibility checks
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
