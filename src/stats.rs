//! Read-only progress statistics derived from the question store.

use crate::database::store::{QuestionFilter, QuestionStore};
use crate::error::Result;
use std::collections::BTreeMap;
use std::time::SystemTime;

/// Accuracy and volume for one exam domain.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainStats {
    pub domain: String,
    pub questions: usize,
    pub attempts: u32,
    pub correct: u32,
    /// `None` when the domain has no attempts yet ("no data", not 0%).
    pub accuracy: Option<f64>,
}

/// Snapshot of overall progress at a point in time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgressReport {
    pub total_questions: usize,
    pub due_questions: usize,
    pub per_domain: Vec<DomainStats>,
    /// Count of questions at each current streak length, sorted by streak.
    pub streaks: Vec<(u32, usize)>,
}

/// Aggregates progress over everything in the store. Never mutates state.
pub fn progress_report(store: &QuestionStore, now: SystemTime) -> Result<ProgressReport> {
    let entries = store.list(&QuestionFilter::default())?;

    let mut per_domain: BTreeMap<String, DomainStats> = BTreeMap::new();
    let mut streaks: BTreeMap<u32, usize> = BTreeMap::new();
    let mut due_questions = 0;

    for (question, state) in &entries {
        let stats = per_domain
            .entry(question.domain.clone())
            .or_insert_with(|| DomainStats {
                domain: question.domain.clone(),
                questions: 0,
                attempts: 0,
                correct: 0,
                accuracy: None,
            });
        stats.questions += 1;
        stats.attempts += state.total_attempts;
        stats.correct += state.total_correct;

        *streaks.entry(state.streak).or_default() += 1;
        if state.next_due <= now {
            due_questions += 1;
        }
    }

    let per_domain = per_domain
        .into_values()
        .map(|mut stats| {
            if stats.attempts > 0 {
                stats.accuracy = Some(f64::from(stats.correct) / f64::from(stats.attempts));
            }
            stats
        })
        .collect();

    Ok(ProgressReport {
        total_questions: entries.len(),
        due_questions,
        per_domain,
        streaks: streaks.into_iter().collect(),
    })
}
