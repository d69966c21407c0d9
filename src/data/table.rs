use std::cmp::Ordering;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, instrument, warn};

use crate::error::FundError;

/// The input CSV as untyped strings, one `Vec` per row, header order preserved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parses CSV text with a header row.
    ///
    /// Rows shorter than the header are padded with empty cells, so the
    /// coercion stage nulls or drops them. A row longer than the header cannot
    /// be aligned to the columns and fails with `RaggedRow`; so does an input
    /// without a header row (`EmptyInput`).
    #[instrument(level = "debug", skip(text), fields(bytes = text.len()))]
    pub fn from_csv_str(text: &str) -> Result<Self, FundError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(FundError::EmptyInput);
        }

        let mut rows = Vec::new();
        let mut padded = 0;
        for record in reader.records() {
            let record: StringRecord = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            match record.len().cmp(&headers.len()) {
                Ordering::Greater => {
                    return Err(FundError::RaggedRow {
                        line,
                        expected: headers.len(),
                        got: record.len(),
                    });
                }
                Ordering::Less => {
                    warn!(
                        "Row on line {} has {} of {} fields; padding with empty cells",
                        line,
                        record.len(),
                        headers.len()
                    );
                    padded += 1;
                }
                Ordering::Equal => {}
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
        debug!(
            "Read {} rows with {} columns ({} short rows padded)",
            rows.len(),
            headers.len(),
            padded
        );
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replaces the header row, keeping the data rows.
    pub fn with_headers(self, headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: self.rows,
        }
    }

    /// Splits the table into its header and per-column value vectors.
    pub fn into_columns(self) -> (Vec<String>, Vec<Vec<String>>) {
        let mut columns: Vec<Vec<String>> = (0..self.headers.len())
            .map(|_| Vec::with_capacity(self.rows.len()))
            .collect();
        for row in self.rows {
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }
        (self.headers, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv_str_reads_quoted_thousands() {
        let text = "Scheme Name,Net Asset Value\nUmoja Fund,\"1,234,567.89\"\nLiquid Fund,\" 42 \"\n";
        let table = RawTable::from_csv_str(text).unwrap();
        assert_eq!(table.headers(), &["Scheme Name", "Net Asset Value"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][1], "1,234,567.89");
        assert_eq!(table.rows()[1][1], " 42 ");
    }

    #[test]
    fn test_from_csv_str_empty_input() {
        assert!(matches!(
            RawTable::from_csv_str(""),
            Err(FundError::EmptyInput)
        ));
    }

    #[test]
    fn test_from_csv_str_header_only() {
        let table = RawTable::from_csv_str("A,B\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers().len(), 2);
    }

    #[test]
    fn test_from_csv_str_pads_short_row() {
        let text = "A,B,C\n1,2,3\nNo data available\n4,5\n";
        let table = RawTable::from_csv_str(text).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[1], vec!["No data available", "", ""]);
        assert_eq!(table.rows()[2], vec!["4", "5", ""]);
    }

    #[test]
    fn test_from_csv_str_long_row_is_fatal() {
        let text = "A,B\n1,2\n3,4,5\n";
        match RawTable::from_csv_str(text) {
            Err(FundError::RaggedRow { line, expected, got }) => {
                assert_eq!(line, 3);
                assert_eq!(expected, 2);
                assert_eq!(got, 3);
            }
            other => panic!("Expected RaggedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_into_columns() {
        let table = RawTable::new(
            vec!["A".to_string(), "B".to_string()],
            vec![
                vec!["1".to_string(), "x".to_string()],
                vec!["2".to_string(), "y".to_string()],
            ],
        );
        let (headers, columns) = table.into_columns();
        assert_eq!(headers, vec!["A", "B"]);
        assert_eq!(columns, vec![vec!["1", "2"], vec!["x", "y"]]);
    }
}
