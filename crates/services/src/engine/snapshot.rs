use quiz_core::model::{Phase, SessionId, Tier};
use source::LoadError;

/// Read-only view of one answer choice.
///
/// `correct` is `None` until the answer for the current question has been
/// revealed, so a presentation layer can never leak the solution early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    pub text: String,
    pub correct: Option<bool>,
}

/// Read-only view of the question currently presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub wording: String,
    pub choices: Vec<ChoiceView>,
    pub selected: Option<usize>,
}

/// Immutable snapshot of the session, emitted on every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub session_id: SessionId,
    pub phase: Phase,
    /// Present only while a question is on screen (`InProgress` or
    /// `AnswerRevealed`).
    pub question: Option<QuestionView>,
    /// Index of the question being presented; equals `total` once finished.
    pub current_index: usize,
    pub score: u32,
    pub total: usize,
    pub elapsed_seconds: u64,
    /// Loader failure reason while in the `Error` phase.
    pub error: Option<LoadError>,
    /// Final classification, present once the session is finished.
    pub tier: Option<Tier>,
}
