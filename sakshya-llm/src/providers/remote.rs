//! Remote fine-tuned model endpoint
//!
//! A GPU web endpoint that takes `{"prompt": ...}` and answers with
//! `{"generated_text": ...}`.

use super::client::HttpClient;
use super::invalid_response;
use super::types::{RemoteGenerateRequest, RemoteGenerateResponse};
use crate::Classifier;
use async_trait::async_trait;
use sakshya_core::{RemoteBackendSettings, SakshyaResult};
use std::time::Duration;

pub const PROVIDER_ID: &str = "remote";

pub struct RemoteClassifier {
    client: HttpClient,
    url: String,
}

impl RemoteClassifier {
    pub fn new(settings: &RemoteBackendSettings) -> Self {
        Self {
            client: HttpClient::new(
                PROVIDER_ID,
                settings.requests_per_minute,
                Duration::from_secs(settings.timeout_secs),
            ),
            url: settings.url.clone(),
        }
    }

    fn build_request(prompt: &str) -> RemoteGenerateRequest {
        RemoteGenerateRequest {
            prompt: prompt.to_string(),
        }
    }

    fn extract_text(response: RemoteGenerateResponse) -> SakshyaResult<String> {
        response
            .generated_text
            .ok_or_else(|| invalid_response(PROVIDER_ID, "Missing generated_text"))
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate(&self, prompt: &str) -> SakshyaResult<String> {
        let response: RemoteGenerateResponse = self
            .client
            .post_json(&self.url, &[], &Self::build_request(prompt))
            .await?;
        Self::extract_text(response)
    }
}

impl std::fmt::Debug for RemoteClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClassifier")
            .field("url", &self.url)
            .finish()
    }
}
