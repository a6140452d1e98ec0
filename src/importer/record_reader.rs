// ==========================================
// Logistics Sync - delimited record reader
// ==========================================
// Semicolon-delimited text, first line = header, ragged rows
// tolerated. Rows are produced one at a time and consumed
// immediately by the next stage; the file is never buffered
// whole past the decode step.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::{ReaderBuilder, StringRecordsIntoIter};
use std::io::Cursor;

/// One raw extract row: positional cells under the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRow {
    /// 1-based data row number (header excluded), for reporting.
    pub row_number: usize,
    pub cells: Vec<String>,
}

impl ExtractRow {
    /// Cell at a resolved column position. Missing trailing
    /// cells read as empty; extra cells are simply never asked
    /// for.
    pub fn cell(&self, position: usize) -> &str {
        self.cells.get(position).map(String::as_str).unwrap_or("")
    }
}

// ==========================================
// DelimitedReader - lazy forward-only row stream
// ==========================================
pub struct DelimitedReader {
    headers: Vec<String>,
    records: StringRecordsIntoIter<Cursor<Vec<u8>>>,
    row_number: usize,
}

impl DelimitedReader {
    pub fn from_text(text: String) -> ImportResult<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .from_reader(Cursor::new(text.into_bytes()));

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ImportError::SourceUnreadable(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        Ok(Self {
            headers,
            records: reader.into_records(),
            row_number: 0,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// 1-based number of the most recently produced data row;
    /// on a row error, the number of the row that failed.
    pub fn current_row(&self) -> usize {
        self.row_number
    }
}

impl Iterator for DelimitedReader {
    type Item = ImportResult<ExtractRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let result = self.records.next()?;
            self.row_number += 1;

            match result {
                Ok(record) => {
                    let cells: Vec<String> =
                        record.iter().map(|cell| cell.trim().to_string()).collect();

                    // fully blank rows are skipped, not counted
                    if cells.iter().all(|c| c.is_empty()) {
                        continue;
                    }

                    return Some(Ok(ExtractRow {
                        row_number: self.row_number,
                        cells,
                    }));
                }
                Err(e) => return Some(Err(ImportError::SourceUnreadable(e.to_string()))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_rows() {
        let reader =
            DelimitedReader::from_text("Branch;TIN;Date\nA;123;2024-01-05\nB;456;2024-01-06\n".to_string())
                .unwrap();
        assert_eq!(reader.headers(), &["Branch", "TIN", "Date"]);

        let rows: Vec<ExtractRow> = reader.map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 1);
        assert_eq!(rows[0].cells, vec!["A", "123", "2024-01-05"]);
        assert_eq!(rows[1].row_number, 2);
    }

    #[test]
    fn test_ragged_rows_tolerated() {
        let reader = DelimitedReader::from_text(
            "Branch;TIN;Date\nA;123\nB;456;2024-01-06;extra;cells\n".to_string(),
        )
        .unwrap();
        let rows: Vec<ExtractRow> = reader.map(|r| r.unwrap()).collect();

        // missing trailing cells default to empty
        assert_eq!(rows[0].cell(2), "");
        // extra cells are ignored by positional access
        assert_eq!(rows[1].cell(0), "B");
        assert_eq!(rows[1].cell(2), "2024-01-06");
    }

    #[test]
    fn test_blank_rows_skipped() {
        let reader =
            DelimitedReader::from_text("Branch;TIN\nA;123\n;\n\nB;456\n".to_string()).unwrap();
        let rows: Vec<ExtractRow> = reader.map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cell(0), "A");
        assert_eq!(rows[1].cell(0), "B");
    }

    #[test]
    fn test_current_row_tracks_produced_rows() {
        let mut reader = DelimitedReader::from_text(
            "Branch;TIN\nA;123\n;\nB;456\n".to_string(),
        )
        .unwrap();
        assert_eq!(reader.current_row(), 0);

        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.row_number, 1);
        assert_eq!(reader.current_row(), 1);

        // the skipped blank row still advances the counter,
        // so error reporting never points at row 0
        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.row_number, 3);
        assert_eq!(reader.current_row(), 3);
    }

    #[test]
    fn test_cells_are_trimmed() {
        let reader = DelimitedReader::from_text("Branch;TIN\n  A  ; 123 \n".to_string()).unwrap();
        let rows: Vec<ExtractRow> = reader.map(|r| r.unwrap()).collect();
        assert_eq!(rows[0].cells, vec!["A", "123"]);
    }
}
