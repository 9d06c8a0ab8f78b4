use async_trait::async_trait;
use reqwest::Client;

use quiz_core::model::QuestionDraft;

use crate::provider::{records_into_drafts, LoadError, QuestionRecord, QuestionSource};

/// Question source fetching JSON banks over HTTP.
///
/// Banks are expected at `<base_url>/<source_id>.json`.
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Use a preconfigured client (timeouts, proxies, ...).
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn bank_url(&self, source_id: &str) -> String {
        format!("{}/{source_id}.json", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    async fn load_questions(&self, source_id: &str) -> Result<Vec<QuestionDraft>, LoadError> {
        let url = self.bank_url(source_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoadError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Unreachable(format!(
                "{url} returned status {status}"
            )));
        }

        let records: Vec<QuestionRecord> = response
            .json()
            .await
            .map_err(|e| LoadError::Malformed(e.to_string()))?;
        records_into_drafts(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_url_joins_without_double_slash() {
        let source = HttpSource::new("https://example.test/banks/");
        assert_eq!(
            source.bank_url("questions_en"),
            "https://example.test/banks/questions_en.json"
        );
    }
}
