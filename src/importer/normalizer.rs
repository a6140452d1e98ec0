// ==========================================
// Logistics Sync - field normalizer / validator
// ==========================================
// Converts raw cell text into typed values and decides
// per-row accept/reject. Rejected rows are counted with a
// reason and never reach the reconciler.
// ==========================================

use crate::domain::{BusinessKey, FieldType, FieldValue, LogicalRecord};
use crate::importer::profiles::KindProfile;
use crate::importer::record_reader::ExtractRow;
use crate::importer::schema::ColumnMap;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::{BTreeMap, HashSet};

// ==========================================
// RowOutcome - accept or reject, with reason
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(LogicalRecord),
    Rejected { row_number: usize, reason: String },
}

/// Normalize one extract row against a kind profile.
pub fn normalize_row(
    profile: &KindProfile,
    columns: &ColumnMap,
    row: &ExtractRow,
    valid_tins: &HashSet<String>,
) -> RowOutcome {
    let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();

    for (idx, spec) in profile.fields.iter().enumerate() {
        let raw = match columns.position(idx) {
            Some(pos) => row.cell(pos),
            // unresolved optional column: absent for every row
            None => "",
        };

        match spec.value_type {
            FieldType::Text => match clean_text(raw) {
                Some(text) => {
                    fields.insert(spec.name.to_string(), FieldValue::Text(text));
                }
                None if spec.required => {
                    return reject(row, format!("missing required field '{}'", spec.name));
                }
                None => {}
            },
            FieldType::Identifier => match clean_identifier(raw) {
                Some(tin) => {
                    if profile.referential_field == Some(spec.name)
                        && !valid_tins.contains(&tin)
                    {
                        return reject(
                            row,
                            format!("unknown owning party '{}' in field '{}'", tin, spec.name),
                        );
                    }
                    fields.insert(spec.name.to_string(), FieldValue::Text(tin));
                }
                None if spec.required => {
                    return reject(
                        row,
                        format!("invalid identifier in field '{}': '{}'", spec.name, raw),
                    );
                }
                None => {}
            },
            FieldType::Date => match clean_text(raw) {
                Some(text) => match parse_date(&text) {
                    Some(date) => {
                        fields.insert(spec.name.to_string(), FieldValue::Date(date));
                    }
                    None if spec.required => {
                        return reject(
                            row,
                            format!("bad date in field '{}': '{}'", spec.name, text),
                        );
                    }
                    None => {}
                },
                None if spec.required => {
                    return reject(row, format!("missing required field '{}'", spec.name));
                }
                None => {}
            },
            // numeric fields never reject the row
            FieldType::Int => {
                fields.insert(spec.name.to_string(), FieldValue::Int(parse_int(raw)));
            }
            FieldType::Decimal => {
                fields.insert(
                    spec.name.to_string(),
                    FieldValue::Decimal(parse_decimal(raw)),
                );
            }
            FieldType::Bool => {
                fields.insert(spec.name.to_string(), FieldValue::Bool(parse_bool(raw)));
            }
        }
    }

    let mut key_parts = Vec::with_capacity(profile.key_fields.len());
    for key_field in profile.key_fields {
        match fields.get(*key_field) {
            Some(value) => key_parts.push(value.canonical()),
            None => return reject(row, format!("missing key field '{}'", key_field)),
        }
    }

    RowOutcome::Accepted(LogicalRecord {
        key: BusinessKey::from_parts(key_parts),
        fields,
        row_number: row.row_number,
    })
}

fn reject(row: &ExtractRow, reason: String) -> RowOutcome {
    RowOutcome::Rejected {
        row_number: row.row_number,
        reason,
    }
}

// ==========================================
// Cell-level normalizers
// ==========================================

/// Trim, strip trailing delimiter artifacts, empty -> missing.
pub fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches(';').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Strip every non-digit character; empty after stripping is
/// a validation failure, signalled as None.
pub fn clean_identifier(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Parse a date in one of the supported layouts; first match
/// wins. Date-only layouts land at midnight.
///
/// Order: ISO `YYYY-MM-DD[ HH:mm[:ss]]`, local
/// `DD.MM.YYYY[ HH:mm]`, then the generic fallback set.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d.%m.%Y %H:%M:%S",
        "%d.%m.%Y %H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y%m%d", "%d/%m/%Y"];

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Thousands separators and whitespace stripped; unparseable
/// is 0, never a row rejection.
pub fn parse_int(raw: &str) -> i64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '\'' && *c != '\u{A0}')
        .collect();
    cleaned.parse::<i64>().unwrap_or(0)
}

/// Comma is the decimal separator; thousands separators
/// (spaces, NBSP, apostrophes) stripped; unparseable is 0.
pub fn parse_decimal(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '\u{A0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// "1" or case-insensitive "true"; anything else is false.
pub fn parse_bool(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed == "1" || trimmed.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordKind;
    use crate::importer::profiles::profile_for;
    use crate::importer::schema::resolve_columns;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  A  "), Some("A".to_string()));
        assert_eq!(clean_text("A;"), Some("A".to_string()));
        assert_eq!(clean_text("   "), None);
        assert_eq!(clean_text(";"), None);
    }

    #[test]
    fn test_clean_identifier() {
        assert_eq!(clean_identifier(" 12-34 56 "), Some("123456".to_string()));
        assert_eq!(clean_identifier("ИНН 7701234567"), Some("7701234567".to_string()));
        assert_eq!(clean_identifier("abc"), None);
        assert_eq!(clean_identifier(""), None);
    }

    #[test]
    fn test_parse_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date("2024-01-05"), Some(expected));
        assert_eq!(parse_date("05.01.2024"), Some(expected));
        assert_eq!(parse_date("20240105"), Some(expected));
        assert_eq!(parse_date("05/01/2024"), Some(expected));

        let with_time = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(parse_date("2024-01-05 14:30"), Some(with_time));
        assert_eq!(parse_date("05.01.2024 14:30"), Some(with_time));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_parse_date_round_trip() {
        // representative set including a leap day and a
        // midnight time component
        let dates = [
            NaiveDate::from_ymd_opt(2024, 2, 29)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 15)
                .unwrap()
                .and_hms_opt(8, 5, 0)
                .unwrap(),
        ];

        for d in dates {
            let iso = d.format("%Y-%m-%d %H:%M:%S").to_string();
            assert_eq!(parse_date(&iso), Some(d), "ISO round trip: {iso}");

            let local = d.format("%d.%m.%Y %H:%M:%S").to_string();
            assert_eq!(parse_date(&local), Some(d), "local round trip: {local}");
        }

        // date-only layouts round-trip through midnight
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let formatted = leap.format("%d.%m.%Y").to_string();
        assert_eq!(
            parse_date(&formatted),
            Some(leap.and_time(NaiveTime::MIN))
        );
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("1 234"), 1234);
        assert_eq!(parse_int("1,234"), 1234);
        assert_eq!(parse_int("\u{A0}5"), 5);
        assert_eq!(parse_int("-7"), -7);
        assert_eq!(parse_int("abc"), 0);
        assert_eq!(parse_int(""), 0);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("12,5"), 12.5);
        assert_eq!(parse_decimal("1 234.56"), 1234.56);
        assert_eq!(parse_decimal("abc"), 0.0);
        assert_eq!(parse_decimal(""), 0.0);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("yes"));
        assert!(!parse_bool(""));
    }

    // ==========================================
    // Row-level accept/reject
    // ==========================================

    fn stock_columns() -> (&'static KindProfile, ColumnMap) {
        let profile = profile_for(RecordKind::StockItems);
        let headers: Vec<String> = ["Branch", "TIN", "Date", "Qty"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let columns = resolve_columns(profile.kind, profile.fields, &headers).unwrap();
        (profile, columns)
    }

    fn row(cells: &[&str]) -> ExtractRow {
        ExtractRow {
            row_number: 1,
            cells: cells.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn tins(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_row_accepted() {
        let (profile, columns) = stock_columns();
        let outcome = normalize_row(
            profile,
            &columns,
            &row(&["A", "1234567890", "2024-01-05", "10"]),
            &tins(&["1234567890"]),
        );

        match outcome {
            RowOutcome::Accepted(record) => {
                assert_eq!(record.key.to_string(), "A/1234567890/2024-01-05");
                assert_eq!(record.field("qty"), Some(&FieldValue::Int(10)));
            }
            other => panic!("expected accept, got {other:?}"),
        }
    }

    #[test]
    fn test_row_rejected_bad_date() {
        let (profile, columns) = stock_columns();
        let outcome = normalize_row(
            profile,
            &columns,
            &row(&["A", "1234567890", "05-31-2024", "10"]),
            &tins(&["1234567890"]),
        );
        match outcome {
            RowOutcome::Rejected { reason, .. } => assert!(reason.contains("bad date")),
            other => panic!("expected reject, got {other:?}"),
        }
    }

    #[test]
    fn test_row_rejected_unknown_owning_party() {
        let (profile, columns) = stock_columns();
        let outcome = normalize_row(
            profile,
            &columns,
            &row(&["A", "9999999999", "2024-01-05", "10"]),
            &tins(&["1234567890"]),
        );
        match outcome {
            RowOutcome::Rejected { reason, .. } => {
                assert!(reason.contains("unknown owning party"))
            }
            other => panic!("expected reject, got {other:?}"),
        }
    }

    #[test]
    fn test_row_rejected_missing_required() {
        let (profile, columns) = stock_columns();
        let outcome = normalize_row(
            profile,
            &columns,
            &row(&["", "1234567890", "2024-01-05", "10"]),
            &tins(&["1234567890"]),
        );
        match outcome {
            RowOutcome::Rejected { reason, .. } => {
                assert!(reason.contains("missing required field"))
            }
            other => panic!("expected reject, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_qty_becomes_zero() {
        let (profile, columns) = stock_columns();
        let outcome = normalize_row(
            profile,
            &columns,
            &row(&["A", "1234567890", "2024-01-05", "n/a"]),
            &tins(&["1234567890"]),
        );
        match outcome {
            RowOutcome::Accepted(record) => {
                assert_eq!(record.field("qty"), Some(&FieldValue::Int(0)));
            }
            other => panic!("expected accept, got {other:?}"),
        }
    }
}
