//! JSON import/export.
//!
//! The exchange format is an array of objects with `domain`, `question`,
//! `answer` and `type` keys, in the store's listing order.

use super::{ImportReport, QuestionRecord, import_records};
use crate::database::store::{QuestionFilter, QuestionStore};
use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Imports questions from a JSON array.
///
/// Each element is validated on its own; malformed or invalid records are
/// reported in the result while the remaining ones are still stored.
pub fn import_json(store: &mut QuestionStore, reader: impl Read) -> Result<ImportReport> {
    let values: Vec<serde_json::Value> = serde_json::from_reader(reader)?;

    let records = values.into_iter().enumerate().map(|(i, value)| {
        let record = serde_json::from_value::<QuestionRecord>(value).map_err(|e| e.to_string());
        (i + 1, record)
    });

    import_records(store, records)
}

/// Imports questions from a JSON file.
pub fn import_json_path(store: &mut QuestionStore, path: &Path) -> Result<ImportReport> {
    let file = File::open(path)?;
    import_json(store, BufReader::new(file))
}

/// Serializes every stored question, in listing order.
pub fn export_json(store: &QuestionStore) -> Result<String> {
    let records: Vec<QuestionRecord> = store
        .list(&QuestionFilter::default())?
        .iter()
        .map(|(q, _)| QuestionRecord::from(q))
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Writes the JSON export to a file.
pub fn export_json_to_path(store: &QuestionStore, path: &Path) -> Result<()> {
    let json = export_json(store)?;
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(json.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionKind;

    fn seeded_store() -> QuestionStore {
        let mut store = QuestionStore::open_in_memory().unwrap();
        store
            .create(
                "Network Security",
                "What port does HTTPS use?",
                "443",
                QuestionKind::Flashcard,
            )
            .unwrap();
        store
            .create(
                "Cryptography",
                "Which algorithm is symmetric?",
                "AES",
                QuestionKind::MultipleChoice,
            )
            .unwrap();
        store
    }

    #[test]
    fn test_import_valid_array() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let json = r#"[
            {"domain": "Threats", "question": "What is phishing?", "answer": "Fraudulent messages", "type": "flashcard"},
            {"domain": "Threats", "question": "Name a DoS mitigation", "answer": "Rate limiting", "type": "Performance_Based"}
        ]"#;

        let report = import_json(&mut store, json.as_bytes()).unwrap();
        assert_eq!(report.added, 2);
        assert!(report.errors.is_empty());

        let all = store.list(&QuestionFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
        // Type tag is normalized on store.
        assert_eq!(all[1].0.kind, QuestionKind::PerformanceBased);
    }

    #[test]
    fn test_import_reports_invalid_records_and_keeps_valid_ones() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let json = r#"[
            {"domain": "Threats", "question": "ok", "answer": "yes", "type": "flashcard"},
            {"domain": "Threats", "question": "", "answer": "yes", "type": "flashcard"},
            {"domain": "Threats", "question": "bad type", "answer": "yes", "type": "essay"},
            {"domain": "Threats", "question": "no answer key", "type": "flashcard"}
        ]"#;

        let report = import_json(&mut store, json.as_bytes()).unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.errors.len(), 3);
        assert_eq!(report.errors[0].record, 2);
        assert_eq!(report.errors[1].record, 3);
        assert_eq!(report.errors[2].record, 4);

        assert_eq!(store.list(&QuestionFilter::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_import_malformed_json_fails_whole_import() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let result = import_json(&mut store, "{ not json ]".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_export_then_import_roundtrip() {
        let store = seeded_store();
        let exported = export_json(&store).unwrap();

        let mut restored = QuestionStore::open_in_memory().unwrap();
        let report = import_json(&mut restored, exported.as_bytes()).unwrap();
        assert_eq!(report.added, 2);
        assert!(report.errors.is_empty());

        // id and review state are not part of the contract, the four
        // exchange fields are.
        assert_eq!(export_json(&restored).unwrap(), exported);
    }

    #[test]
    fn test_export_to_path_and_import_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");

        let store = seeded_store();
        export_json_to_path(&store, &path).unwrap();

        let mut restored = QuestionStore::open_in_memory().unwrap();
        let report = import_json_path(&mut restored, &path).unwrap();
        assert_eq!(report.added, 2);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let result = import_json_path(&mut store, Path::new("nonexistent_xyz123.json"));
        assert!(result.is_err());
    }
}
