//! General-purpose cloud model backend (Gemini)

use super::client::HttpClient;
use super::invalid_response;
use super::types::{
    CloudContent, CloudGenerateRequest, CloudGenerateResponse, CloudGenerationConfig, CloudPart,
};
use crate::Classifier;
use async_trait::async_trait;
use sakshya_core::{CloudBackendSettings, SakshyaResult};
use std::time::Duration;

pub const PROVIDER_ID: &str = "cloud";

pub struct CloudClassifier {
    client: HttpClient,
    endpoint: String,
    api_key: String,
    model: String,
}

impl CloudClassifier {
    pub fn new(settings: &CloudBackendSettings) -> Self {
        Self {
            client: HttpClient::new(
                PROVIDER_ID,
                settings.requests_per_minute,
                Duration::from_secs(settings.timeout_secs),
            ),
            endpoint: format!(
                "{}/models/{}:generateContent",
                settings.base_url.trim_end_matches('/'),
                settings.model
            ),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(prompt: &str) -> CloudGenerateRequest {
        CloudGenerateRequest {
            contents: vec![CloudContent {
                role: Some("user".to_string()),
                parts: vec![CloudPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: CloudGenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: None,
            },
        }
    }

    fn extract_text(response: CloudGenerateResponse) -> SakshyaResult<String> {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| invalid_response(PROVIDER_ID, "No candidate text in response"))
    }
}

#[async_trait]
impl Classifier for CloudClassifier {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate(&self, prompt: &str) -> SakshyaResult<String> {
        let response: CloudGenerateResponse = self
            .client
            .post_json(
                &self.endpoint,
                &[("x-goog-api-key", self.api_key.as_str())],
                &Self::build_request(prompt),
            )
            .await?;
        Self::extract_text(response)
    }
}

impl std::fmt::Debug for CloudClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudClassifier")
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_format() {
        let classifier = CloudClassifier::new(&CloudBackendSettings {
            api_key: "k".to_string(),
            model: "gemini-2.5-flash-lite".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            requests_per_minute: 60,
            timeout_secs: 30,
        });
        assert_eq!(
            classifier.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-lite:generateContent"
        );
    }

    #[test]
    fn test_request_asks_for_json() {
        let body = serde_json::to_value(CloudClassifier::build_request("compare")).unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "compare");
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_extract_first_candidate_text() {
        let response: CloudGenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"classification\":\"consistent\"}"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(
            CloudClassifier::extract_text(response).unwrap(),
            r#"{"classification":"consistent"}"#
        );
    }

    #[test]
    fn test_extract_blocked_response_is_invalid() {
        let response: CloudGenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(CloudClassifier::extract_text(response).is_err());

        let empty: CloudGenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(CloudClassifier::extract_text(empty).is_err());
    }
}
