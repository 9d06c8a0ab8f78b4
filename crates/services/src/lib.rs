#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod runtime;
pub mod shuffle;
mod timer;

pub use quiz_core::Clock;

pub use engine::{ChoiceView, QuestionView, QuizSession, Snapshot, DEFAULT_REVEAL_TICKS};
pub use error::{CommandError, CommandKind, RuntimeError};
pub use runtime::{Command, QuizHandle, QuizRuntime};
pub use shuffle::shuffle;
