//! Quiz session management.
//!
//! A session is an ordered single pass over the questions due at its start
//! time. Each answer is committed to the store immediately, so an aborted
//! session loses only the unanswered remainder.

use super::{Question, ReviewState, scheduler};
use crate::database::store::{QuestionFilter, QuestionStore};
use crate::error::Result;
use std::sync::{Arc, Mutex};

pub struct QuizSession {
    pub questions: Vec<(Question, ReviewState)>,
    pub current_index: usize,
    pub show_answer: bool,
    pub answered_count: usize,
    pub correct_count: usize,
    store: Arc<Mutex<QuestionStore>>,
}

impl QuizSession {
    /// Selects the questions due right now, ordered by `(next_due, id)`,
    /// and opens a session over them. An empty session is valid and means
    /// there is nothing to review.
    pub fn start(
        store: Arc<Mutex<QuestionStore>>,
        filter: &QuestionFilter,
        max_count: usize,
    ) -> Result<Self> {
        let questions = {
            let guard = store.lock().unwrap();
            let now = guard.current_time()?;
            guard.due(filter, max_count, now)?
        };

        Ok(Self {
            questions,
            current_index: 0,
            show_answer: false,
            answered_count: 0,
            correct_count: 0,
            store,
        })
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index).map(|(q, _)| q)
    }

    pub fn reveal_answer(&mut self) {
        self.show_answer = true;
    }

    /// Grades the current question, commits the new review state, and moves
    /// to the next one.
    pub fn answer(&mut self, correct: bool) -> Result<()> {
        let Some((_, state)) = self.questions.get_mut(self.current_index) else {
            return Ok(());
        };

        let next = {
            let guard = self.store.lock().unwrap();
            let now = guard.current_time()?;
            let next = scheduler::next_state(state, correct, now);
            guard.update_review_state(&next)?;
            next
        };
        *state = next;

        self.answered_count += 1;
        if correct {
            self.correct_count += 1;
        }
        self.current_index += 1;
        self.show_answer = false;
        Ok(())
    }

    pub fn total_count(&self) -> usize {
        self.questions.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.answered_count
    }

    pub fn is_completed(&self) -> bool {
        self.current_index >= self.questions.len()
    }

    pub fn progress_message(&self) -> String {
        format!(
            "Question {} of {} ({} correct so far)",
            (self.current_index + 1).min(self.total_count()),
            self.total_count(),
            self.correct_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionKind;

    fn shared_store(count: usize) -> Arc<Mutex<QuestionStore>> {
        let mut store = QuestionStore::open_in_memory().unwrap();
        for i in 0..count {
            store
                .create("General", &format!("q{i}"), "a", QuestionKind::Flashcard)
                .unwrap();
        }
        Arc::new(Mutex::new(store))
    }

    #[test]
    fn test_session_selects_only_due_questions() {
        let store = shared_store(3);
        let session = QuizSession::start(Arc::clone(&store), &QuestionFilter::default(), 10).unwrap();

        assert_eq!(session.total_count(), 3);
        let now = store.lock().unwrap().current_time().unwrap();
        assert!(session.questions.iter().all(|(_, s)| s.next_due <= now));
    }

    #[test]
    fn test_session_truncates_to_max_count() {
        let store = shared_store(5);
        let session = QuizSession::start(store, &QuestionFilter::default(), 2).unwrap();
        assert_eq!(session.total_count(), 2);
        // Deterministic order: earliest due first, then lowest id.
        assert_eq!(session.questions[0].0.id, 1);
        assert_eq!(session.questions[1].0.id, 2);
    }

    #[test]
    fn test_empty_session_is_valid_and_completed() {
        let store = shared_store(0);
        let session = QuizSession::start(store, &QuestionFilter::default(), 10).unwrap();
        assert_eq!(session.total_count(), 0);
        assert!(session.is_completed());
    }

    #[test]
    fn test_answers_commit_incrementally() {
        let store = shared_store(2);
        let mut session =
            QuizSession::start(Arc::clone(&store), &QuestionFilter::default(), 10).unwrap();

        session.answer(true).unwrap();

        // The first answer is already durable before the session ends.
        let guard = store.lock().unwrap();
        let (_, first) = guard.get(1).unwrap();
        assert_eq!(first.total_attempts, 1);
        assert_eq!(first.streak, 1);
        let (_, second) = guard.get(2).unwrap();
        assert_eq!(second.total_attempts, 0);
        drop(guard);

        session.answer(false).unwrap();
        assert!(session.is_completed());
        assert_eq!(session.correct_count, 1);
        assert_eq!(session.answered_count, 2);

        let guard = store.lock().unwrap();
        let (_, second) = guard.get(2).unwrap();
        assert_eq!(second.total_attempts, 1);
        assert_eq!(second.streak, 0);
    }

    #[test]
    fn test_answer_past_end_is_a_no_op() {
        let store = shared_store(1);
        let mut session =
            QuizSession::start(Arc::clone(&store), &QuestionFilter::default(), 10).unwrap();

        session.answer(true).unwrap();
        session.answer(true).unwrap();

        let guard = store.lock().unwrap();
        let (_, state) = guard.get(1).unwrap();
        assert_eq!(state.total_attempts, 1);
    }
}
