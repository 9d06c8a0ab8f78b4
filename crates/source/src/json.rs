use async_trait::async_trait;
use std::path::{Path, PathBuf};

use quiz_core::model::QuestionDraft;

use crate::provider::{records_into_drafts, LoadError, QuestionRecord, QuestionSource};

/// Question source backed by JSON documents on disk.
///
/// Each bank lives in `<dir>/<source_id>.json` as an array of question
/// records, so per-language banks are just sibling files
/// (`questions_en.json`, `questions_es.json`, ...).
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn bank_path(&self, source_id: &str) -> PathBuf {
        self.dir.join(format!("{source_id}.json"))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl QuestionSource for JsonFileSource {
    async fn load_questions(&self, source_id: &str) -> Result<Vec<QuestionDraft>, LoadError> {
        let path = self.bank_path(source_id);
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| LoadError::Unreachable(format!("{}: {e}", path.display())))?;
        let records: Vec<QuestionRecord> =
            serde_json::from_str(&raw).map_err(|e| LoadError::Malformed(e.to_string()))?;
        records_into_drafts(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_bank(dir: &Path, source_id: &str, body: &str) {
        std::fs::write(dir.join(format!("{source_id}.json")), body).unwrap();
    }

    #[tokio::test]
    async fn loads_bank_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        write_bank(
            dir.path(),
            "questions_en",
            r#"[
                {"wording": "What does AJAX use to fetch data?",
                 "choices": [
                    {"text": "XMLHttpRequest", "correct": true},
                    {"text": "FTP"},
                    {"text": "SMTP"}
                 ]}
            ]"#,
        );

        let source = JsonFileSource::new(dir.path());
        let drafts = source.load_questions("questions_en").await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].choices.len(), 3);
        assert!(drafts[0].choices[0].is_correct);
        assert!(!drafts[0].choices[1].is_correct);
    }

    #[tokio::test]
    async fn missing_file_is_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path());
        let err = source.load_questions("questions_en").await.unwrap_err();
        assert!(matches!(err, LoadError::Unreachable(_)));
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write_bank(dir.path(), "questions_en", "{ not json ]");
        let source = JsonFileSource::new(dir.path());
        let err = source.load_questions("questions_en").await.unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[tokio::test]
    async fn empty_array_is_empty_error() {
        let dir = tempfile::tempdir().unwrap();
        write_bank(dir.path(), "questions_en", "[]");
        let source = JsonFileSource::new(dir.path());
        let err = source.load_questions("questions_en").await.unwrap_err();
        assert_eq!(err, LoadError::Empty);
    }
}
