mod machine;
mod snapshot;

// Public API of the session engine.
pub use machine::{QuizSession, DEFAULT_REVEAL_TICKS};
pub use snapshot::{ChoiceView, QuestionView, Snapshot};
