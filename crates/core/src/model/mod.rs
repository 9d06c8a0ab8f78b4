mod ids;
mod outcome;
mod question;
mod session;

pub use ids::SessionId;
pub use outcome::{percentage, Tier};
pub use question::{
    Choice, ChoiceDraft, ChoiceValidationError, Question, QuestionDraft, QuestionValidationError,
};
pub use session::{Phase, QuizSummary, SummaryError};
