pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod stats;

pub use database::{QuestionFilter, QuestionStore};
pub use error::{Error, Result};
pub use models::{Question, QuestionKind, QuizSession, ReviewState};
