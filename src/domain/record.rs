// ==========================================
// Logistics Sync - record entities
// ==========================================
// Typed field values, business keys and the
// logical/stored record shapes flowing through
// the import pipeline
// ==========================================

use crate::domain::types::RecordKind;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// FieldValue - one typed cell value
// ==========================================
// Dates are naive local timestamps end to end; no UTC
// conversion happens anywhere between parsing and storage.
// Absence is modelled as absence from the record map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum FieldValue {
    Text(String),
    Date(NaiveDateTime),
    Int(i64),
    Decimal(f64),
    Bool(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Canonical string form used for business-key parts and
    /// for the stored compare value. Midnight timestamps render
    /// date-only so that date columns written without a time
    /// component stay key-stable across runs.
    pub fn canonical(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Date(d) => {
                if d.time() == NaiveTime::MIN {
                    d.date().format("%Y-%m-%d").to_string()
                } else {
                    d.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            FieldValue::Int(v) => v.to_string(),
            FieldValue::Decimal(v) => v.to_string(),
            FieldValue::Bool(v) => if *v { "1" } else { "0" }.to_string(),
        }
    }
}

// ==========================================
// BusinessKey - identity across runs
// ==========================================
// Ordered tuple of 3-4 normalized string fields; the extract
// carries no surrogate identifier. Stored joined with a unit
// separator so it fits a single indexed column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BusinessKey(String);

impl BusinessKey {
    pub const SEPARATOR: char = '\u{1F}';

    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = parts
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(&Self::SEPARATOR.to_string());
        BusinessKey(joined)
    }

    /// Rebuild a key from its stored joined representation.
    pub fn from_joined(joined: impl Into<String>) -> Self {
        BusinessKey(joined.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.0.split(Self::SEPARATOR)
    }
}

impl fmt::Display for BusinessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in self.parts() {
            if !first {
                f.write_str("/")?;
            }
            f.write_str(part)?;
            first = false;
        }
        Ok(())
    }
}

// ==========================================
// LogicalRecord - one normalized extract row
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalRecord {
    pub key: BusinessKey,
    pub fields: BTreeMap<String, FieldValue>,
    pub row_number: usize,
}

impl LogicalRecord {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// JSON payload persisted in the store's payload column.
    pub fn payload_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.fields)
    }
}

// ==========================================
// KeyProjection - Identity Index entry
// ==========================================
// Projection of one stored record: just enough to compute
// identity plus the store id, and the declared compare value
// for kinds that compare before writing.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyProjection {
    pub id: i64,
    pub key: BusinessKey,
    pub compare_value: Option<String>,
}

// ==========================================
// RecordWrite - one staged store write
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RecordWrite {
    pub kind: RecordKind,
    pub key: BusinessKey,
    pub doc_date: Option<NaiveDate>,
    pub compare_value: Option<String>,
    pub payload: String,
}
