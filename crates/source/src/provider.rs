use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use quiz_core::model::{ChoiceDraft, QuestionDraft};

/// Errors surfaced by question sources.
///
/// The reason strings are passed through to the presentation layer unchanged,
/// so they should be human-readable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadError {
    #[error("question source unreachable: {0}")]
    Unreachable(String),

    #[error("question source malformed: {0}")]
    Malformed(String),

    #[error("question source contains no questions")]
    Empty,
}

/// Wire shape for a single answer choice in a question bank document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

impl ChoiceRecord {
    #[must_use]
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }
}

/// Wire shape for a question in a question bank document.
///
/// This mirrors the domain `QuestionDraft` so sources can deserialize
/// documents without leaking the document format into the domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub wording: String,
    pub choices: Vec<ChoiceRecord>,
}

impl QuestionRecord {
    #[must_use]
    pub fn new(wording: impl Into<String>, choices: Vec<ChoiceRecord>) -> Self {
        Self {
            wording: wording.into(),
            choices,
        }
    }

    /// Convert the record into a domain draft for validation downstream.
    #[must_use]
    pub fn into_draft(self) -> QuestionDraft {
        QuestionDraft::new(
            self.wording,
            self.choices
                .into_iter()
                .map(|c| ChoiceDraft::new(c.text, c.correct))
                .collect(),
        )
    }
}

/// Convert a deserialized bank into domain drafts, rejecting empty banks.
///
/// # Errors
///
/// Returns `LoadError::Empty` if the bank holds no questions.
pub fn records_into_drafts(records: Vec<QuestionRecord>) -> Result<Vec<QuestionDraft>, LoadError> {
    if records.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(records.into_iter().map(QuestionRecord::into_draft).collect())
}

/// Loader contract for question banks.
///
/// A source identifier names one bank (for the file-backed source that is the
/// document stem, e.g. `questions_en`).
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Load the ordered question list for the given source identifier.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Unreachable` if the bank cannot be fetched,
    /// `LoadError::Malformed` if it cannot be parsed, and `LoadError::Empty`
    /// if it holds no questions.
    async fn load_questions(&self, source_id: &str) -> Result<Vec<QuestionDraft>, LoadError>;
}

/// Simple in-memory source implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemorySource {
    banks: Arc<Mutex<HashMap<String, Vec<QuestionRecord>>>>,
}

impl InMemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            banks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a bank under the given identifier, replacing any previous one.
    pub fn insert_bank(&self, source_id: impl Into<String>, records: Vec<QuestionRecord>) {
        if let Ok(mut guard) = self.banks.lock() {
            guard.insert(source_id.into(), records);
        }
    }
}

#[async_trait]
impl QuestionSource for InMemorySource {
    async fn load_questions(&self, source_id: &str) -> Result<Vec<QuestionDraft>, LoadError> {
        let records = {
            let guard = self
                .banks
                .lock()
                .map_err(|e| LoadError::Unreachable(e.to_string()))?;
            guard
                .get(source_id)
                .cloned()
                .ok_or_else(|| LoadError::Unreachable(format!("no bank named {source_id}")))?
        };
        records_into_drafts(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bank() -> Vec<QuestionRecord> {
        vec![QuestionRecord::new(
            "What does XML stand for?",
            vec![
                ChoiceRecord::new("eXtensible Markup Language", true),
                ChoiceRecord::new("eXtra Modern Language", false),
            ],
        )]
    }

    #[tokio::test]
    async fn loads_registered_bank_in_order() {
        let source = InMemorySource::new();
        source.insert_bank("questions_en", sample_bank());

        let drafts = source.load_questions("questions_en").await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].wording, "What does XML stand for?");
        assert!(drafts[0].choices[0].is_correct);
        assert!(!drafts[0].choices[1].is_correct);
    }

    #[tokio::test]
    async fn missing_bank_is_unreachable() {
        let source = InMemorySource::new();
        let err = source.load_questions("nope").await.unwrap_err();
        assert!(matches!(err, LoadError::Unreachable(_)));
    }

    #[tokio::test]
    async fn empty_bank_is_empty_error() {
        let source = InMemorySource::new();
        source.insert_bank("questions_en", Vec::new());
        let err = source.load_questions("questions_en").await.unwrap_err();
        assert_eq!(err, LoadError::Empty);
    }

    #[test]
    fn record_converts_to_draft() {
        let record = QuestionRecord::new(
            "Q",
            vec![ChoiceRecord::new("a", false), ChoiceRecord::new("b", true)],
        );
        let draft = record.into_draft();
        assert_eq!(draft.choices.len(), 2);
        assert!(draft.choices[1].is_correct);
    }
}
