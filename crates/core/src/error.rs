use thiserror::Error;

use crate::model::{QuestionValidationError, SummaryError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionValidationError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
}
