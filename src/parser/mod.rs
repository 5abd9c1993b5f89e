//! Shared CSV decoding for the ingest pipeline.
//!
//! Both pipeline stages read the same spooled file: the materializer
//! consumes only the header row, then the loader re-opens the file and
//! decodes every data row. Decoding is deliberately lenient about row
//! width (`flexible`), so a ragged row reaches the loader and fails
//! inside its transaction instead of dying here.

use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Read the header row of a CSV file.
///
/// Returns the raw header fields in file order. An empty file fails
/// with [`CsvError::NoHeader`].
pub fn read_header(path: &Path) -> CsvResult<Vec<String>> {
    let mut reader = open(path)?;
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(CsvError::NoHeader);
    }
    Ok(headers.iter().map(str::to_string).collect())
}

/// Read every data row of a CSV file, skipping the header.
///
/// Rows come back in file order, each with its own field count. A file
/// holding only a header row yields an empty vector.
pub fn read_rows(path: &Path) -> CsvResult<Vec<StringRecord>> {
    let mut reader = open(path)?;
    if reader.headers()?.is_empty() {
        return Err(CsvError::NoHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?);
    }
    Ok(rows)
}

fn open(path: &Path) -> CsvResult<Reader<File>> {
    let file = File::open(path)?;
    Ok(ReaderBuilder::new().flexible(true).from_reader(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_header() {
        let file = csv_file("First Name,Age\nAda,36\n");
        let headers = read_header(file.path()).unwrap();
        assert_eq!(headers, vec!["First Name", "Age"]);
    }

    #[test]
    fn test_read_header_empty_file() {
        let file = csv_file("");
        let err = read_header(file.path()).unwrap_err();
        assert!(matches!(err, CsvError::NoHeader));
    }

    #[test]
    fn test_read_header_missing_file() {
        let err = read_header(Path::new("/nonexistent/input.csv")).unwrap_err();
        assert!(matches!(err, CsvError::Io(_)));
    }

    #[test]
    fn test_read_rows_in_file_order() {
        let file = csv_file("A,B\nx,1\ny,2\n");
        let rows = read_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["x", "1"]);
        assert_eq!(rows[1], vec!["y", "2"]);
    }

    #[test]
    fn test_read_rows_header_only() {
        let file = csv_file("A,B\n");
        let rows = read_rows(file.path()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_read_rows_keeps_ragged_widths() {
        // Width mismatches are the loader's concern, not a decode error.
        let file = csv_file("A,B\nx,1\ny\nz,2,3\n");
        let rows = read_rows(file.path()).unwrap();
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].len(), 1);
        assert_eq!(rows[2].len(), 3);
    }

    #[test]
    fn test_read_rows_preserves_values_verbatim() {
        let file = csv_file("A,B\n\"  spaced  \",\"quoted, comma\"\n");
        let rows = read_rows(file.path()).unwrap();
        assert_eq!(rows[0].get(0), Some("  spaced  "));
        assert_eq!(rows[0].get(1), Some("quoted, comma"));
    }
}
