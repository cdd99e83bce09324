//! Backend request and response types

use serde::{Deserialize, Serialize};

// ============================================================================
// REMOTE (fine-tuned model endpoint)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RemoteGenerateRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteGenerateResponse {
    #[serde(default)]
    pub generated_text: Option<String>,
}

// ============================================================================
// HOSTED (inference API)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HostedGenerateRequest {
    pub inputs: String,
    pub parameters: HostedParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostedParameters {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub do_sample: bool,
    pub return_full_text: bool,
}

impl Default for HostedParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 2048,
            temperature: 0.2,
            top_p: 0.9,
            do_sample: true,
            return_full_text: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostedGeneration {
    #[serde(default)]
    pub generated_text: String,
}

// ============================================================================
// LOCAL (Ollama)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LocalGenerateRequest {
    pub model: String,
    pub prompt: String,
    pub system: String,
    pub stream: bool,
    pub format: String,
    pub options: LocalOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocalOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
    pub num_predict: i32,
}

impl Default for LocalOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.9,
            repeat_penalty: 1.1,
            num_predict: 2048,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalGenerateResponse {
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

// ============================================================================
// CLOUD (Gemini generateContent)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudGenerateRequest {
    pub contents: Vec<CloudContent>,
    pub generation_config: CloudGenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<CloudPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudGenerationConfig {
    pub response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudGenerateResponse {
    #[serde(default)]
    pub candidates: Vec<CloudCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudCandidate {
    pub content: Option<CloudContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}
