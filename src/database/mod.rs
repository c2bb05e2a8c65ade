pub mod store;

pub use store::{QuestionFilter, QuestionStore};
