// ==========================================
// Logistics Sync - core enum types
// ==========================================
// Record kinds, run modes and the per-kind
// coordinator state machine values
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// RecordKind - the six import pipelines
// ==========================================
// Each kind instantiates the same engine with its own
// profile (see importer::profiles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Orders,
    StockItems,
    FinanceDocs,
    Complaints,
    Vehicles,
    Trailers,
}

impl RecordKind {
    /// All kinds, in the order `run_all` processes them.
    pub const ALL: [RecordKind; 6] = [
        RecordKind::Orders,
        RecordKind::StockItems,
        RecordKind::FinanceDocs,
        RecordKind::Complaints,
        RecordKind::Vehicles,
        RecordKind::Trailers,
    ];

    /// Stable identifier used in the store and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Orders => "orders",
            RecordKind::StockItems => "stock_items",
            RecordKind::FinanceDocs => "finance_docs",
            RecordKind::Complaints => "complaints",
            RecordKind::Vehicles => "vehicles",
            RecordKind::Trailers => "trailers",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orders" => Ok(RecordKind::Orders),
            "stock_items" | "stock" => Ok(RecordKind::StockItems),
            "finance_docs" | "finance" => Ok(RecordKind::FinanceDocs),
            "complaints" => Ok(RecordKind::Complaints),
            "vehicles" => Ok(RecordKind::Vehicles),
            "trailers" => Ok(RecordKind::Trailers),
            other => Err(format!("unknown record kind: {}", other)),
        }
    }
}

// ==========================================
// RunMode - full sync vs windowed/partial
// ==========================================
// Consulted twice: by the Identity Index load (trailing
// window) and by the reconciler (removal suppression).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Store is brought into exact correspondence with the
    /// extract; records absent from the extract are removed.
    FullSync,
    /// Only creates/updates are applied. A windowed extract
    /// cannot claim that an absent entity no longer exists,
    /// so the removal step is skipped entirely.
    Windowed,
}

impl RunMode {
    pub fn is_windowed(&self) -> bool {
        matches!(self, RunMode::Windowed)
    }
}

// ==========================================
// RunState - per-kind coordinator state
// ==========================================
// Idle -> Running -> Idle. Entering Running while already
// Running drops the new invocation (not queued).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

// ==========================================
// ComparePolicy - per-kind update semantics
// ==========================================
// Most kinds write through on every matched row (audit
// timestamps move even when values do not). FinanceDocs
// compares its single mutable field and skips the write
// when unchanged. Preserved per kind, not unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparePolicy {
    AlwaysWrite,
    SkipIfUnchanged { field: &'static str },
}

// ==========================================
// FieldType - declared cell type in a profile
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    /// Tax/registration-style identifier: non-digits stripped,
    /// empty after stripping is a validation failure.
    Identifier,
    Date,
    Int,
    Decimal,
    Bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_round_trip() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.as_str().parse::<RecordKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_record_kind_aliases() {
        assert_eq!("stock".parse::<RecordKind>(), Ok(RecordKind::StockItems));
        assert_eq!("FINANCE".parse::<RecordKind>(), Ok(RecordKind::FinanceDocs));
        assert!("unknown".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_run_mode_windowed() {
        assert!(RunMode::Windowed.is_windowed());
        assert!(!RunMode::FullSync.is_windowed());
    }
}
