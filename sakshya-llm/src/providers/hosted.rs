//! Hosted inference API backend

use super::client::HttpClient;
use super::invalid_response;
use super::types::{HostedGenerateRequest, HostedGeneration, HostedParameters};
use crate::prompts::chatml_user_turn;
use crate::Classifier;
use async_trait::async_trait;
use sakshya_core::{HostedBackendSettings, SakshyaResult};
use std::time::Duration;

pub const PROVIDER_ID: &str = "hosted";

/// Inference API client for an instruct model, prompted in ChatML.
pub struct HostedClassifier {
    client: HttpClient,
    endpoint: String,
    authorization: String,
    model_id: String,
}

impl HostedClassifier {
    pub fn new(settings: &HostedBackendSettings) -> Self {
        Self {
            client: HttpClient::new(
                PROVIDER_ID,
                settings.requests_per_minute,
                Duration::from_secs(settings.timeout_secs),
            ),
            endpoint: format!(
                "{}/{}",
                settings.base_url.trim_end_matches('/'),
                settings.model_id
            ),
            authorization: format!("Bearer {}", settings.token),
            model_id: settings.model_id.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(prompt: &str) -> HostedGenerateRequest {
        HostedGenerateRequest {
            inputs: chatml_user_turn(prompt),
            parameters: HostedParameters::default(),
        }
    }

    fn extract_text(generations: Vec<HostedGeneration>) -> SakshyaResult<String> {
        generations
            .into_iter()
            .next()
            .map(|g| g.generated_text.trim().to_string())
            .ok_or_else(|| invalid_response(PROVIDER_ID, "No generation in response"))
    }
}

#[async_trait]
impl Classifier for HostedClassifier {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate(&self, prompt: &str) -> SakshyaResult<String> {
        let generations: Vec<HostedGeneration> = self
            .client
            .post_json(
                &self.endpoint,
                &[("Authorization", self.authorization.as_str())],
                &Self::build_request(prompt),
            )
            .await?;
        Self::extract_text(generations)
    }
}

impl std::fmt::Debug for HostedClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedClassifier")
            .field("model_id", &self.model_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
