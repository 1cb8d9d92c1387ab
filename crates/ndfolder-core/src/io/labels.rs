//! Position label lists: the first column of a spreadsheet without a header
//! row, one label per acquisition position in acquisition order.

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};

use crate::error::{FolderError, Result};

/// Read labels from `.xlsx` (first worksheet) or `.csv`, picked by extension.
/// Empty cells are skipped.
pub fn read_position_labels(path: &Path) -> Result<Vec<String>> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("xlsx") => read_xlsx_labels(path),
        Some("csv") => {
            let rdr = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(path)?;
            read_csv_records(rdr)
        }
        _ => Err(FolderError::InvalidLabels {
            path: path.to_path_buf(),
            message: "only .xlsx and .csv are supported".into(),
        }),
    }
}

fn read_xlsx_labels(path: &Path) -> Result<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FolderError::InvalidLabels {
            path: path.to_path_buf(),
            message: "no worksheet".into(),
        })??;

    Ok(sheet
        .rows()
        .filter_map(|row| row.first())
        .filter(|cell| !matches!(cell, Data::Empty))
        .map(|cell| cell.to_string().trim().to_string())
        .filter(|label| !label.is_empty())
        .collect())
}

/// Labels from delimited text held in memory.
pub fn parse_csv_labels(contents: &str) -> Result<Vec<String>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(contents.as_bytes());
    read_csv_records(rdr)
}

fn read_csv_records<R: Read>(mut rdr: csv::Reader<R>) -> Result<Vec<String>> {
    let mut labels = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(label) = record.get(0).map(str::trim).filter(|l| !l.is_empty()) {
            labels.push(label.to_string());
        }
    }
    Ok(labels)
}
