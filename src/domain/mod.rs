// ==========================================
// Logistics Sync - domain model layer
// ==========================================
// Entities and types shared across the pipeline.
// No data access, no engine logic here.
// ==========================================

pub mod record;
pub mod report;
pub mod types;

// Re-export core types
pub use record::{BusinessKey, FieldValue, KeyProjection, LogicalRecord, RecordWrite};
pub use report::{ImportMeta, RunReport, SkipReason};
pub use types::{ComparePolicy, FieldType, RecordKind, RunMode, RunState};
