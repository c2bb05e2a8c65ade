//! Simplified spaced repetition scheduling.
//!
//! A bounded-level scheme rather than full SM-2:
//! - A correct answer promotes the question one level (up to `MAX_LEVEL`)
//!   and extends its streak.
//! - An incorrect answer resets the streak and demotes one level (down to 0),
//!   so a single lapse does not erase all prior progress.
//! - The delay until the next review comes from a fixed lookup table indexed
//!   by level, so spacing grows monotonically and saturates.

use super::ReviewState;
use std::time::{Duration, SystemTime};

/// Highest spacing level a question can reach.
pub const MAX_LEVEL: u32 = 5;

const DAY: u64 = 24 * 60 * 60;

/// Delay before the next review for each level. Level 0 is immediately due.
pub const LEVEL_DELAYS: [Duration; MAX_LEVEL as usize + 1] = [
    Duration::from_secs(0),
    Duration::from_secs(DAY),
    Duration::from_secs(3 * DAY),
    Duration::from_secs(7 * DAY),
    Duration::from_secs(14 * DAY),
    Duration::from_secs(30 * DAY),
];

/// Computes the review state after one answer.
///
/// Pure function: the result depends only on `state`, `correct`, and `now`.
pub fn next_state(state: &ReviewState, correct: bool, now: SystemTime) -> ReviewState {
    let (interval, streak) = if correct {
        ((state.interval + 1).min(MAX_LEVEL), state.streak + 1)
    } else {
        (state.interval.saturating_sub(1), 0)
    };

    ReviewState {
        question_id: state.question_id,
        interval,
        next_due: now + LEVEL_DELAYS[interval as usize],
        streak,
        total_attempts: state.total_attempts + 1,
        total_correct: state.total_correct + u32::from(correct),
    }
}
