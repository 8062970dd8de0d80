//! Diagnosis-code lookup.
//!
//! `CodeIndex` holds the loaded table and answers substring queries.
//! `ReferenceTable` is the explicitly constructed handle collaborators share:
//! it loads the table on first use and hands out the same index afterwards.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use crate::domain::{CodeRecord, Scope};
use crate::error::AppError;
use crate::io::ingest::{LoadedTable, load_code_table};

/// Read-only, searchable view of the reference table.
#[derive(Debug, Clone)]
pub struct CodeIndex {
    records: Vec<CodeRecord>,
    /// Lowercased (code, short, long) per record, same order as `records`.
    haystacks: Vec<[String; 3]>,
    has_exclusion_column: bool,
}

impl CodeIndex {
    pub fn new(records: Vec<CodeRecord>, has_exclusion_column: bool) -> Self {
        let haystacks = records
            .iter()
            .map(|r| {
                [
                    r.code.to_lowercase(),
                    r.short_label.to_lowercase(),
                    r.long_label.to_lowercase(),
                ]
            })
            .collect();
        Self {
            records,
            haystacks,
            has_exclusion_column,
        }
    }

    pub fn from_loaded(table: LoadedTable) -> Self {
        let has_exclusion_column = table.schema.exclusion.is_some();
        Self::new(table.records, has_exclusion_column)
    }

    /// All records in source order.
    pub fn records(&self) -> &[CodeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the source table carried an exclusion column.
    ///
    /// Without one every record counts as included and scope filtering is
    /// skipped entirely.
    pub fn has_exclusion_column(&self) -> bool {
        self.has_exclusion_column
    }

    /// Records in `scope` whose code, short label, or long label contains
    /// `text` (case-insensitive). Empty `text` returns the whole scope.
    pub fn query(&self, text: &str, scope: Scope) -> Vec<&CodeRecord> {
        self.query_positions(text, scope)
            .into_iter()
            .map(|i| &self.records[i])
            .collect()
    }

    /// Same as [`CodeIndex::query`], returning positions into [`CodeIndex::records`].
    pub fn query_positions(&self, text: &str, scope: Scope) -> Vec<usize> {
        let needle = text.to_lowercase();
        let scope = if self.has_exclusion_column { scope } else { Scope::All };
        let out: Vec<usize> = self
            .records
            .iter()
            .zip(&self.haystacks)
            .enumerate()
            .filter(|(_, (record, _))| scope.admits(record))
            .filter(|(_, (_, hay))| needle.is_empty() || hay.iter().any(|h| h.contains(&needle)))
            .map(|(i, _)| i)
            .collect();

        tracing::debug!(query = text, scope = ?scope, matches = out.len(), "code lookup");
        out
    }

    /// Exact (case-insensitive) code lookup.
    pub fn find_code(&self, code: &str) -> Option<&CodeRecord> {
        let code = code.trim();
        self.records.iter().find(|r| r.code.eq_ignore_ascii_case(code))
    }
}

/// Shared handle that loads the reference table at most once.
#[derive(Debug)]
pub struct ReferenceTable {
    path: PathBuf,
    index: OnceLock<Arc<CodeIndex>>,
}

impl ReferenceTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            index: OnceLock::new(),
        }
    }

    /// Wrap an index that is already in memory (tests, embedding callers).
    pub fn preloaded(index: CodeIndex) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::new(index));
        Self {
            path: PathBuf::new(),
            index: cell,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.index.get().is_some()
    }

    /// Load the table on first call; later calls return the same index.
    pub fn load(&self) -> Result<Arc<CodeIndex>, AppError> {
        if let Some(index) = self.index.get() {
            return Ok(Arc::clone(index));
        }

        let table = load_code_table(&self.path)?;
        for err in &table.row_errors {
            tracing::warn!(line = err.line, "skipped reference row: {}", err.message);
        }
        if table.schema.exclusion.is_none() {
            tracing::warn!("reference table has no exclusion column; scope filtering is a no-op");
        }
        tracing::info!(
            path = %self.path.display(),
            rows = table.records.len(),
            skipped = table.row_errors.len(),
            "loaded reference table"
        );

        let index = Arc::new(CodeIndex::from_loaded(table));
        Ok(Arc::clone(self.index.get_or_init(|| index)))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn record(code: &str, short: &str, long: &str, excluded: bool) -> CodeRecord {
        CodeRecord {
            code: code.to_string(),
            short_label: short.to_string(),
            long_label: long.to_string(),
            excluded,
        }
    }

    fn sample_index() -> CodeIndex {
        CodeIndex::new(
            vec![
                record(
                    "A000",
                    "Cholera due to Vibrio cholerae",
                    "Cholera due to Vibrio cholerae 01",
                    false,
                ),
                record(
                    "E119",
                    "Type 2 diabetes w/o complications",
                    "Type 2 diabetes mellitus without complications",
                    true,
                ),
                record("I10", "Essential hypertension", "Essential (primary) hypertension", false),
                record(
                    "E1165",
                    "Type 2 diabetes w hyperglycemia",
                    "Type 2 diabetes mellitus with hyperglycemia",
                    false,
                ),
                record("Z9981", "Dependence on oxygen", "Dependence on supplemental oxygen", true),
            ],
            true,
        )
    }

    fn codes(rows: &[&CodeRecord]) -> Vec<String> {
        rows.iter().map(|r| r.code.clone()).collect()
    }

    #[test]
    fn empty_query_returns_scope_in_source_order() {
        let index = sample_index();
        for scope in Scope::ALL {
            let expected: Vec<&CodeRecord> =
                index.records().iter().filter(|r| scope.admits(r)).collect();
            assert_eq!(index.query("", scope), expected, "scope {scope:?}");
        }
        assert_eq!(codes(&index.query("", Scope::Included)), ["A000", "I10", "E1165"]);
        assert_eq!(codes(&index.query("", Scope::Excluded)), ["E119", "Z9981"]);
    }

    #[test]
    fn matches_any_of_the_three_text_fields() {
        let index = sample_index();
        // code
        assert_eq!(codes(&index.query("i10", Scope::All)), ["I10"]);
        // short label
        assert_eq!(codes(&index.query("W HYPERGLYCEMIA", Scope::All)), ["E1165"]);
        // long label only
        assert_eq!(codes(&index.query("supplemental", Scope::All)), ["Z9981"]);
    }

    #[test]
    fn results_contain_query_and_respect_scope() {
        let index = sample_index();
        let cases = [
            ("diabetes", Scope::Included),
            ("e1", Scope::Excluded),
            ("o", Scope::All),
        ];
        for (text, scope) in cases {
            let needle = text.to_lowercase();
            for r in index.query(text, scope) {
                assert!(scope.admits(r));
                assert!(
                    r.code.to_lowercase().contains(&needle)
                        || r.short_label.to_lowercase().contains(&needle)
                        || r.long_label.to_lowercase().contains(&needle)
                );
            }
        }
        assert_eq!(codes(&index.query("diabetes", Scope::Included)), ["E1165"]);
        assert_eq!(codes(&index.query("diabetes", Scope::Excluded)), ["E119"]);
    }

    #[test]
    fn query_is_literal_not_a_pattern() {
        let index = sample_index();
        assert!(index.query("(primary)", Scope::All).len() == 1);
        assert!(index.query(".*", Scope::All).is_empty());
    }

    #[test]
    fn no_match_is_an_empty_result() {
        assert!(sample_index().query("zzz-not-a-code", Scope::All).is_empty());
    }

    #[test]
    fn find_code_ignores_case() {
        let index = sample_index();
        assert_eq!(index.find_code(" e119 ").map(|r| r.code.as_str()), Some("E119"));
        assert!(index.find_code("E11").is_none());
    }

    #[test]
    fn reference_table_loads_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CODE,SHORT DESCRIPTION,LONG DESCRIPTION,NF EXCL").unwrap();
        writeln!(file, "R0600,Dyspnea unspecified,Dyspnea unspecified,").unwrap();
        writeln!(file, "R0902,Hypoxemia,Hypoxemia,Y").unwrap();
        file.flush().unwrap();

        let table = ReferenceTable::new(file.path());
        assert!(!table.is_loaded());
        let first = table.load().unwrap();
        assert!(table.is_loaded());

        // Removing the file proves the second call never re-reads it.
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());

        let second = table.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
        assert_eq!(codes(&second.query("", Scope::Excluded)), ["R0902"]);
    }

    #[test]
    fn preloaded_table_serves_the_given_index() {
        let table = ReferenceTable::preloaded(sample_index());
        assert!(table.is_loaded());
        let first = table.load().unwrap();
        assert!(Arc::ptr_eq(&first, &table.load().unwrap()));
        assert_eq!(codes(&first.query("", Scope::Excluded)), ["E119", "Z9981"]);
    }

    #[test]
    fn missing_table_fails_and_stays_unloaded() {
        let table = ReferenceTable::new("/nonexistent/table.csv");
        assert!(table.load().is_err());
        assert!(!table.is_loaded());
    }

    #[test]
    fn scope_is_a_no_op_without_exclusion_column() {
        let index = CodeIndex::new(vec![record("A00", "a", "a", false)], false);
        assert!(!index.has_exclusion_column());
        for scope in Scope::ALL {
            assert_eq!(codes(&index.query("", scope)), ["A00"]);
        }
    }
}
