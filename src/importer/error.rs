// ==========================================
// Logistics Sync - import engine error types
// ==========================================
// Only fatal, run-aborting conditions become errors here.
// Row-level and write-level failures are counted in the
// RunReport and never abort the run.
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// Import engine error type
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== input errors =====
    #[error("extract source unreadable: {0}")]
    SourceUnreadable(String),

    // ===== schema errors =====
    #[error("required columns unresolved for {kind}: {}", fields.join(", "))]
    MissingColumns { kind: String, fields: Vec<String> },

    // ===== store errors =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== generic errors =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::SourceUnreadable(err.to_string())
    }
}

/// Result type alias
pub type ImportResult<T> = Result<T, ImportError>;
