//! CSV import.
//!
//! Expects a header row `domain,question,answer,type`; each data row maps
//! positionally to those fields.

use super::{ImportReport, QuestionRecord, import_records};
use crate::database::store::QuestionStore;
use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Imports questions from CSV. Rows that fail to parse or validate are
/// reported individually; the remaining rows are still stored.
pub fn import_csv(store: &mut QuestionStore, reader: impl Read) -> Result<ImportReport> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let record = match result {
            Ok(row) => Ok(QuestionRecord {
                domain: row.get(0).unwrap_or("").to_string(),
                question: row.get(1).unwrap_or("").to_string(),
                answer: row.get(2).unwrap_or("").to_string(),
                kind: row.get(3).unwrap_or("").to_string(),
            }),
            Err(e) => Err(e.to_string()),
        };
        rows.push((i + 1, record));
    }

    import_records(store, rows)
}

/// Imports questions from a CSV file.
pub fn import_csv_path(store: &mut QuestionStore, path: &Path) -> Result<ImportReport> {
    let file = File::open(path)?;
    import_csv(store, BufReader::new(file))
}
