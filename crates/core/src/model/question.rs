use thiserror::Error;

//
// ─── CHOICE ────────────────────────────────────────────────────────────────────
//

/// Unvalidated answer choice, as produced by a question source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceDraft {
    pub text: String,
    pub is_correct: bool,
}

impl ChoiceDraft {
    #[must_use]
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }

    /// Validate the draft into an immutable [`Choice`].
    ///
    /// # Errors
    ///
    /// Returns `ChoiceValidationError::EmptyText` if the text is blank.
    pub fn validate(self) -> Result<Choice, ChoiceValidationError> {
        if self.text.trim().is_empty() {
            return Err(ChoiceValidationError::EmptyText);
        }
        Ok(Choice {
            text: self.text,
            is_correct: self.is_correct,
        })
    }
}

/// A single answer choice. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    text: String,
    is_correct: bool,
}

impl Choice {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChoiceValidationError {
    #[error("choice text is empty")]
    EmptyText,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unvalidated question, as produced by a question source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub wording: String,
    pub choices: Vec<ChoiceDraft>,
}

impl QuestionDraft {
    #[must_use]
    pub fn new(wording: impl Into<String>, choices: Vec<ChoiceDraft>) -> Self {
        Self {
            wording: wording.into(),
            choices,
        }
    }

    /// Validate the draft into a [`Question`].
    ///
    /// Zero or multiple correct-flagged choices are both accepted: a question
    /// with none can simply never be scored correct, and when several are
    /// flagged every one of them counts as a correct answer.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError` if the wording is blank, the choice
    /// list is empty, or any choice fails validation.
    pub fn validate(self) -> Result<Question, QuestionValidationError> {
        if self.wording.trim().is_empty() {
            return Err(QuestionValidationError::EmptyWording);
        }
        if self.choices.is_empty() {
            return Err(QuestionValidationError::NoChoices);
        }

        let mut choices = Vec::with_capacity(self.choices.len());
        for (index, draft) in self.choices.into_iter().enumerate() {
            let choice = draft
                .validate()
                .map_err(|source| QuestionValidationError::Choice { index, source })?;
            choices.push(choice);
        }

        Ok(Question {
            wording: self.wording,
            choices,
        })
    }
}

/// A validated question with its ordered choices.
///
/// Choice order is significant: once a session has randomized it, the order
/// stays fixed for that session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    wording: String,
    choices: Vec<Choice>,
}

impl Question {
    #[must_use]
    pub fn wording(&self) -> &str {
        &self.wording
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[must_use]
    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }

    /// Whether the choice at `index` is an accepted answer.
    ///
    /// Out-of-range indices are simply not correct.
    #[must_use]
    pub fn is_correct(&self, index: usize) -> bool {
        self.choices.get(index).is_some_and(Choice::is_correct)
    }

    /// Decompose into wording and choices, for reordering at session setup.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Choice>) {
        (self.wording, self.choices)
    }

    /// Reassemble a question from the parts of an already-validated one.
    ///
    /// Performs no validation; callers must only feed back parts obtained
    /// from [`Question::into_parts`].
    #[must_use]
    pub fn from_parts(wording: String, choices: Vec<Choice>) -> Self {
        Self { wording, choices }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionValidationError {
    #[error("question wording is empty")]
    EmptyWording,

    #[error("question has no choices")]
    NoChoices,

    #[error("invalid choice at index {index}: {source}")]
    Choice {
        index: usize,
        source: ChoiceValidationError,
    },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(wording: &str, choices: &[(&str, bool)]) -> QuestionDraft {
        QuestionDraft::new(
            wording,
            choices
                .iter()
                .map(|(text, correct)| ChoiceDraft::new(*text, *correct))
                .collect(),
        )
    }

    #[test]
    fn question_fails_if_wording_blank() {
        let err = draft("   ", &[("a", true)]).validate().unwrap_err();
        assert_eq!(err, QuestionValidationError::EmptyWording);
    }

    #[test]
    fn question_fails_without_choices() {
        let err = draft("What is XML?", &[]).validate().unwrap_err();
        assert_eq!(err, QuestionValidationError::NoChoices);
    }

    #[test]
    fn question_reports_blank_choice_index() {
        let err = draft("What is XML?", &[("a markup language", true), ("  ", false)])
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            QuestionValidationError::Choice {
                index: 1,
                source: ChoiceValidationError::EmptyText,
            }
        );
    }

    #[test]
    fn valid_question_keeps_choice_order() {
        let question = draft("What is XML?", &[("a", false), ("b", true), ("c", false)])
            .validate()
            .unwrap();

        assert_eq!(question.wording(), "What is XML?");
        let texts: Vec<_> = question.choices().iter().map(Choice::text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert!(question.is_correct(1));
        assert!(!question.is_correct(0));
    }

    #[test]
    fn zero_correct_choices_is_allowed() {
        let question = draft("Unanswerable", &[("a", false), ("b", false)])
            .validate()
            .unwrap();
        assert!((0..2).all(|i| !question.is_correct(i)));
    }

    #[test]
    fn multiple_correct_choices_all_accepted() {
        let question = draft("Pick either", &[("a", true), ("b", true), ("c", false)])
            .validate()
            .unwrap();
        assert!(question.is_correct(0));
        assert!(question.is_correct(1));
        assert!(!question.is_correct(2));
    }

    #[test]
    fn out_of_range_index_is_not_correct() {
        let question = draft("Q", &[("a", true)]).validate().unwrap();
        assert!(!question.is_correct(5));
    }

    #[test]
    fn parts_round_trip() {
        let question = draft("Q", &[("a", true), ("b", false)]).validate().unwrap();
        let expected = question.clone();
        let (wording, choices) = question.into_parts();
        assert_eq!(Question::from_parts(wording, choices), expected);
    }
}
