//! Tabular input adapter
//!
//! Decodes an uploaded byte blob into labelled row objects for the task
//! builder. Delimited text goes through the `csv` crate; spreadsheet
//! binaries go through `calamine`, reading only the first sheet. In both
//! modes the first row is consumed as the header defining column labels,
//! which is why data rows downstream report as their index plus two.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::debug;

use crate::constants::files;
use crate::errors::{ParseError, ParseResult};

/// One decoded data row: column label and stringified cell value pairs,
/// preserved in column order.
#[derive(Debug, Clone, Default)]
pub struct Row {
    columns: Vec<(String, String)>,
}

impl Row {
    /// Build a row from label/value pairs in column order
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self { columns }
    }

    /// Cell values in column order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(_, value)| value.as_str())
    }

    /// First cell whose label contains any of the given substrings,
    /// case-insensitively. Returns the trimmed cell value; empty cells do
    /// not count as a match.
    pub fn find_labelled(&self, needles: &[&str]) -> Option<&str> {
        self.columns
            .iter()
            .find(|(label, value)| {
                let label = label.to_lowercase();
                !value.trim().is_empty() && needles.iter().any(|needle| label.contains(needle))
            })
            .map(|(_, value)| value.trim())
    }
}

/// Tabular format resolved from the input file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetFormat {
    Delimited,
    Workbook,
}

fn resolve_format(source_name: &str) -> ParseResult<SheetFormat> {
    let extension = source_name
        .rsplit('.')
        .next()
        .filter(|ext| !ext.contains('/') && *ext != source_name)
        .ok_or(ParseError::MissingExtension)?
        .to_lowercase();

    if files::DELIMITED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(SheetFormat::Delimited)
    } else if files::WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        Ok(SheetFormat::Workbook)
    } else {
        Err(ParseError::UnsupportedExtension { extension })
    }
}

/// Decode an input blob into labelled data rows.
///
/// The source name is used only to pick the decoder; unsupported extensions
/// fail fast with the offending extension named in the error.
pub fn parse_bytes(source_name: &str, bytes: &[u8]) -> ParseResult<Vec<Row>> {
    let rows = match resolve_format(source_name)? {
        SheetFormat::Delimited => parse_delimited(bytes)?,
        SheetFormat::Workbook => parse_workbook(bytes)?,
    };
    debug!("Decoded {} data rows from {}", rows.len(), source_name);
    Ok(rows)
}

fn parse_delimited(bytes: &[u8]) -> ParseResult<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let labels: Vec<String> = reader
        .headers()?
        .iter()
        .map(|label| label.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let columns = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(Row::new(columns));
    }
    Ok(rows)
}

fn parse_workbook(bytes: &[u8]) -> ParseResult<Vec<Row>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&first_sheet)?;

    let mut cells = range.rows();
    let labels: Vec<String> = match cells.next() {
        Some(header) => header.iter().map(stringify_cell).collect(),
        None => return Ok(Vec::new()),
    };

    let rows = cells
        .map(|cell_row| {
            let columns = labels
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    let value = cell_row.get(i).map(stringify_cell).unwrap_or_default();
                    (label.clone(), value)
                })
                .collect();
            Row::new(columns)
        })
        .collect();
    Ok(rows)
}

/// Stringify a spreadsheet cell the way the rest of the pipeline expects:
/// dates render in day-first calendar form so the naming heuristics can
/// parse them, empty cells become empty strings.
fn stringify_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &[u8] = b"Nama,Tempat,Tanggal,Link\n\
        Alice,HQ,01/02/2020,https://drive.google.com/file/d/ABC123/view\n\
        Bob,Depot,02/03/2021,https://drive.google.com/open?id=DEF456\n";

    #[test]
    fn test_csv_header_defines_labels() {
        let rows = parse_bytes("upload.csv", SAMPLE_CSV).unwrap();
        assert_eq!(rows.len(), 2);

        let first: Vec<&str> = rows[0].values().collect();
        assert_eq!(first, vec![
            "Alice",
            "HQ",
            "01/02/2020",
            "https://drive.google.com/file/d/ABC123/view",
        ]);
    }

    #[test]
    fn test_find_labelled_is_case_insensitive() {
        let rows = parse_bytes("upload.csv", SAMPLE_CSV).unwrap();
        assert_eq!(rows[0].find_labelled(&["nama", "name"]), Some("Alice"));
        assert_eq!(rows[0].find_labelled(&["tanggal", "date"]), Some("01/02/2020"));
        assert_eq!(rows[0].find_labelled(&["missing"]), None);
    }

    #[test]
    fn test_find_labelled_skips_empty_cells() {
        let row = Row::new(vec![
            ("Nama".to_string(), "  ".to_string()),
            ("Full Name".to_string(), "Carol".to_string()),
        ]);
        assert_eq!(row.find_labelled(&["nama", "name"]), Some("Carol"));
    }

    #[test]
    fn test_short_rows_pad_missing_cells() {
        let csv = b"A,B,C\nonly-a\n";
        let rows = parse_bytes("short.csv", csv).unwrap();
        let values: Vec<&str> = rows[0].values().collect();
        assert_eq!(values, vec!["only-a", "", ""]);
    }

    #[test]
    fn test_unsupported_extension_names_offender() {
        let err = parse_bytes("notes.pdf", b"whatever").unwrap_err();
        match err {
            ParseError::UnsupportedExtension { extension } => assert_eq!(extension, "pdf"),
            other => panic!("Expected UnsupportedExtension, got {:?}", other),
        }
    }

    #[test]
    fn test_extensionless_name_rejected() {
        let err = parse_bytes("README", b"whatever").unwrap_err();
        assert!(matches!(err, ParseError::MissingExtension));
    }

    #[test]
    fn test_extension_matching_ignores_case() {
        assert!(parse_bytes("UPLOAD.CSV", SAMPLE_CSV).is_ok());
    }
}
