//! Local model backend (Ollama)

use super::client::HttpClient;
use super::types::{LocalGenerateRequest, LocalGenerateResponse, LocalOptions};
use crate::prompts::SYSTEM_PROMPT;
use crate::Classifier;
use async_trait::async_trait;
use sakshya_core::{LocalBackendSettings, SakshyaResult};
use std::time::Duration;

pub const PROVIDER_ID: &str = "local";

/// Classifier backed by a model served on the local machine.
pub struct LocalClassifier {
    client: HttpClient,
    base_url: String,
    model: String,
}

impl LocalClassifier {
    pub fn new(settings: &LocalBackendSettings) -> Self {
        Self {
            client: HttpClient::new(
                PROVIDER_ID,
                settings.requests_per_minute,
                Duration::from_secs(settings.timeout_secs),
            ),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        }
    }

    fn build_request(&self, prompt: &str) -> LocalGenerateRequest {
        LocalGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            system: SYSTEM_PROMPT.to_string(),
            stream: false,
            format: "json".to_string(),
            options: LocalOptions::default(),
        }
    }
}

#[async_trait]
impl Classifier for LocalClassifier {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate(&self, prompt: &str) -> SakshyaResult<String> {
        let url = format!("{}/api/generate", self.base_url);
        let response: LocalGenerateResponse = self
            .client
            .post_json(&url, &[], &self.build_request(prompt))
            .await?;
        Ok(response.response)
    }
}

impl std::fmt::Debug for LocalClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalClassifier")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_non_streaming_json() {
        let classifier = LocalClassifier::new(&LocalBackendSettings {
            base_url: "http://localhost:11434/".to_string(),
            model: "qwen2.5:7b-instruct".to_string(),
            requests_per_minute: 600,
            timeout_secs: 60,
        });
        let body = serde_json::to_value(classifier.build_request("compare")).unwrap();
        assert_eq!(body["model"], "qwen2.5:7b-instruct");
        assert_eq!(body["prompt"], "compare");
        assert_eq!(body["stream"], false);
        assert_eq!(body["format"], "json");
        assert_eq!(body["system"], SYSTEM_PROMPT);
        assert_eq!(classifier.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_response_decoding() {
        let response: LocalGenerateResponse =
            serde_json::from_str(r#"{"model":"m","response":"{}","done":true}"#).unwrap();
        assert_eq!(response.response, "{}");
        assert!(response.done);
    }
}
