//! Import/export of questions in the CSV/JSON exchange format.

pub mod csv;
pub mod json;

use crate::database::store::QuestionStore;
use crate::error::{Error, Result};
use crate::models::{Question, QuestionKind};
use serde::{Deserialize, Serialize};

/// One question in the exchange format. Review state is intentionally not
/// part of the contract; imported questions always start fresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl From<&Question> for QuestionRecord {
    fn from(q: &Question) -> Self {
        Self {
            domain: q.domain.clone(),
            question: q.prompt.clone(),
            answer: q.answer.clone(),
            kind: q.kind.as_str().to_string(),
        }
    }
}

/// Outcome of an import: how many records were stored, and which ones were
/// rejected and why. Partial success is the designed behavior.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub added: usize,
    pub errors: Vec<ImportError>,
}

/// A single rejected record. `record` is the 1-based position in the input.
#[derive(Debug)]
pub struct ImportError {
    pub record: usize,
    pub reason: String,
}

impl ImportReport {
    fn reject(&mut self, record: usize, reason: impl Into<String>) {
        self.errors.push(ImportError {
            record,
            reason: reason.into(),
        });
    }
}

/// Validates and stores each record individually. Validation failures are
/// collected into the report; storage failures abort the import.
pub(crate) fn import_records<I>(store: &mut QuestionStore, records: I) -> Result<ImportReport>
where
    I: IntoIterator<Item = (usize, std::result::Result<QuestionRecord, String>)>,
{
    let mut report = ImportReport::default();

    for (record_no, record) in records {
        let record = match record {
            Ok(record) => record,
            Err(reason) => {
                report.reject(record_no, reason);
                continue;
            }
        };

        let kind = match record.kind.parse::<QuestionKind>() {
            Ok(kind) => kind,
            Err(reason) => {
                report.reject(record_no, reason);
                continue;
            }
        };

        match store.create(&record.domain, &record.question, &record.answer, kind) {
            Ok(_) => report.added += 1,
            Err(Error::Validation(reason)) => report.reject(record_no, reason),
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}
