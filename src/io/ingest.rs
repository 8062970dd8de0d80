//! Reference-table CSV ingest.
//!
//! This module turns the upstream diagnosis-code table into an ordered list of
//! `CodeRecord`s. It owns schema validation only; searching lives in `lookup`.
//!
//! Design goals:
//! - **Strict schema**: required columns are located by header name, never by
//!   position, and a missing one is a load error
//! - **Row-level validation**: skip bad rows, but report what happened
//! - **Source order preserved** for deterministic display

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::CodeRecord;
use crate::error::AppError;

/// Header of the code column (compared case-insensitively).
pub const CODE_HEADER: &str = "code";
/// Prefix of the short-description column.
pub const SHORT_HEADER_PREFIX: &str = "short";
/// Prefix of the long-description column.
pub const LONG_HEADER_PREFIX: &str = "long";
/// Prefix of the optional claims-exclusion column.
pub const EXCLUSION_HEADER_PREFIX: &str = "nf excl";

/// Column positions resolved from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub code: usize,
    pub short_label: usize,
    pub long_label: usize,
    /// `None` when the table has no exclusion column.
    pub exclusion: Option<usize>,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: records in source order + schema + row errors.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub records: Vec<CodeRecord>,
    pub schema: TableSchema,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load the reference table from a CSV file.
pub fn load_code_table(path: &Path) -> Result<LoadedTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::dataset(format!(
            "Failed to open reference table '{}': {e}",
            path.display()
        ))
    })?;
    read_code_table(file)
}

/// Parse the reference table from any reader.
pub fn read_code_table<R: Read>(source: R) -> Result<LoadedTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::dataset(format!("Failed to read reference table headers: {e}")))?
        .clone();

    let schema = resolve_schema(&headers)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &schema) {
            Ok(row) => records.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if records.is_empty() {
        return Err(AppError::dataset(format!(
            "Reference table has no usable rows ({rows_read} read, {} rejected).",
            row_errors.len()
        )));
    }

    Ok(LoadedTable {
        records,
        schema,
        row_errors,
        rows_read,
    })
}

/// Locate the semantic columns by header name.
pub fn resolve_schema(headers: &StringRecord) -> Result<TableSchema, AppError> {
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();

    let code = find_column(&names, |n| n == CODE_HEADER)
        .ok_or_else(|| AppError::dataset("Missing required column: `CODE`"))?;
    let short_label = find_column(&names, |n| n.starts_with(SHORT_HEADER_PREFIX))
        .ok_or_else(|| AppError::dataset("Missing required column: `SHORT DESCRIPTION`"))?;
    let long_label = find_column(&names, |n| n.starts_with(LONG_HEADER_PREFIX))
        .ok_or_else(|| AppError::dataset("Missing required column: `LONG DESCRIPTION`"))?;
    let exclusion = find_column(&names, |n| n.starts_with(EXCLUSION_HEADER_PREFIX));

    Ok(TableSchema {
        code,
        short_label,
        long_label,
        exclusion,
    })
}

fn find_column(names: &[String], pred: impl Fn(&str) -> bool) -> Option<usize> {
    names.iter().position(|n| pred(n.as_str()))
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often carry a BOM on the first header.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_lowercase()
}

fn parse_row(record: &StringRecord, schema: &TableSchema) -> Result<CodeRecord, String> {
    let code = field(record, schema.code);
    if code.is_empty() {
        return Err("Missing required value: `CODE`".to_string());
    }

    let excluded = schema
        .exclusion
        .map(|idx| !field(record, idx).is_empty())
        .unwrap_or(false);

    Ok(CodeRecord {
        code: code.to_string(),
        short_label: field(record, schema.short_label).to_string(),
        long_label: field(record, schema.long_label).to_string(),
        excluded,
    })
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).map(str::trim).unwrap_or("")
}
