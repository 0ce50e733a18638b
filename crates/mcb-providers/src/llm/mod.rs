//! HTTP LLM client: classification fallback and fact extraction (§6.3).

use async_trait::async_trait;
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{LlmClassification, LlmClient};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: String,
    confidence: f32,
}

#[derive(Debug, Deserialize)]
struct ExtractFactsResponse {
    facts: Vec<Value>,
}

/// Talks to an external LLM backend for classification fallback and fact extraction.
pub struct HttpLlmClient {
    client: Client,
    base_url: String,
}

impl HttpLlmClient {
    #[must_use]
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn classify(&self, text: &str, allowed_labels: &[String], hints: &[String]) -> Result<LlmClassification> {
        let response = self
            .client
            .post(format!("{}/classify", self.base_url))
            .json(&serde_json::json!({
                "text": text,
                "allowedLabels": allowed_labels,
                "hints": hints,
            }))
            .send()
            .await
            .map_err(|e| Error::transient_with_source("LLM classify request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::transient(format!("LLM classify returned status {}", response.status())));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| Error::component_failure("llm_client", format!("malformed classify response: {e}")))?;

        Ok(LlmClassification {
            label: parsed.label,
            confidence: parsed.confidence,
        })
    }

    async fn extract_facts(&self, text: &str, schema_hint: &str) -> Result<Vec<Value>> {
        let response = self
            .client
            .post(format!("{}/extract-facts", self.base_url))
            .json(&serde_json::json!({
                "text": text,
                "schemaHint": schema_hint,
            }))
            .send()
            .await
            .map_err(|e| Error::transient_with_source("LLM extract-facts request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::transient(format!("LLM extract-facts returned status {}", response.status())));
        }

        let parsed: ExtractFactsResponse = response
            .json()
            .await
            .map_err(|e| Error::component_failure("llm_client", format!("malformed extract-facts response: {e}")))?;

        Ok(parsed.facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_is_constructed_with_a_bounded_timeout() {
        let client = HttpLlmClient::new("http://localhost:9000".to_owned(), Duration::from_secs(30));
        assert_eq!(client.base_url, "http://localhost:9000");
    }
}
