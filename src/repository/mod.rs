// ==========================================
// Logistics Sync - data access layer
// ==========================================
// Repositories do data access only; no business logic.
// All queries are parameterised.
// ==========================================

pub mod counterparty_repo;
pub mod error;
pub mod import_meta_repo;
pub mod sync_record_repo;
pub mod sync_record_repo_impl;

// Re-export core repositories
pub use counterparty_repo::{CounterpartyRepository, CounterpartyRepositoryImpl};
pub use error::{RepositoryError, RepositoryResult};
pub use import_meta_repo::{ImportMetaRepository, ImportMetaRepositoryImpl};
pub use sync_record_repo::SyncRecordRepository;
pub use sync_record_repo_impl::SyncRecordRepositoryImpl;
