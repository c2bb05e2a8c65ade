//! Per-question spaced repetition state.
use std::time::SystemTime;

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewState {
    pub question_id: i64,
    /// Current spacing level, clamped to `[0, MAX_LEVEL]` by the scheduler.
    pub interval: u32,
    /// The question is due once this time has passed.
    pub next_due: SystemTime,
    /// Consecutive correct answers; reset to 0 on a miss.
    pub streak: u32,
    pub total_attempts: u32,
    pub total_correct: u32,
}

impl ReviewState {
    /// Initial state for a freshly created question: level 0, due immediately.
    pub fn new(question_id: i64, now: SystemTime) -> Self {
        Self {
            question_id,
            interval: 0,
            next_due: now,
            streak: 0,
            total_attempts: 0,
            total_correct: 0,
        }
    }
}
