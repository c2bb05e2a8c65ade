pub mod question;
pub mod quiz_session;
pub mod review_state;
pub mod scheduler;

pub use question::{Question, QuestionKind};
pub use quiz_session::QuizSession;
pub use review_state::ReviewState;
