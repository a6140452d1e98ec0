// ==========================================
// Logistics Sync - schema resolver
// ==========================================
// Maps declared header labels to the logical field set once,
// on the header row. Every data row is then read by column
// position, never by repeated name lookup.
// ==========================================

use crate::domain::{FieldType, RecordKind};
use crate::importer::error::{ImportError, ImportResult};

// ==========================================
// FieldSpec - one logical field declaration
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Known header label variants, newest first. Extracts
    /// evolve column names over time; the list includes at
    /// least one production typo.
    pub labels: &'static [&'static str],
    pub required: bool,
    pub value_type: FieldType,
}

// ==========================================
// ColumnMap - resolved field -> column positions
// ==========================================
// Parallel to the profile's field list; consulted by index
// for every data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: Vec<Option<usize>>,
}

impl ColumnMap {
    pub fn position(&self, field_idx: usize) -> Option<usize> {
        self.positions.get(field_idx).copied().flatten()
    }
}

/// Resolve every declared field against the header labels.
///
/// Match order per label variant: exact, case-insensitive,
/// then whitespace/underscore/hyphen-insensitive. Required
/// fields left unresolved abort the run with an error naming
/// them; optional ones are treated as absent for every row.
pub fn resolve_columns(
    kind: RecordKind,
    fields: &[FieldSpec],
    headers: &[String],
) -> ImportResult<ColumnMap> {
    let mut positions = Vec::with_capacity(fields.len());
    let mut missing = Vec::new();

    for field in fields {
        let position = resolve_field(field, headers);
        if position.is_none() && field.required {
            missing.push(field.name.to_string());
        }
        positions.push(position);
    }

    if !missing.is_empty() {
        return Err(ImportError::MissingColumns {
            kind: kind.to_string(),
            fields: missing,
        });
    }

    Ok(ColumnMap { positions })
}

fn resolve_field(field: &FieldSpec, headers: &[String]) -> Option<usize> {
    for label in field.labels {
        // exact
        if let Some(pos) = headers.iter().position(|h| h == label) {
            return Some(pos);
        }
        // case-insensitive
        let label_lower = label.to_lowercase();
        if let Some(pos) = headers.iter().position(|h| h.to_lowercase() == label_lower) {
            return Some(pos);
        }
        // whitespace / underscore / hyphen insensitive
        let label_folded = fold_label(label);
        if let Some(pos) = headers.iter().position(|h| fold_label(h) == label_folded) {
            return Some(pos);
        }
    }
    None
}

fn fold_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
