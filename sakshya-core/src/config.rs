//! Configuration types

use crate::{ConfigError, SakshyaResult};
use serde::{Deserialize, Serialize};

/// Default per-request timeout for backend calls, matching the GPU service's
/// cold-start budget.
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 600;

/// Default request budget for rate-limited backends.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

pub const DEFAULT_HOSTED_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_HOSTED_MODEL: &str = "Qwen/Qwen2.5-7B-Instruct";
pub const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_LOCAL_MODEL: &str = "qwen2.5:7b-instruct";
pub const DEFAULT_CLOUD_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CLOUD_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_FALLBACK_LANGUAGE: &str = "en";

fn default_rpm() -> u32 {
    DEFAULT_REQUESTS_PER_MINUTE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_BACKEND_TIMEOUT_SECS
}

// ============================================================================
// BACKENDS
// ============================================================================

/// Which classification backend is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Fine-tuned model behind a remote GPU endpoint
    Remote,
    /// Hosted inference API
    Hosted,
    /// Local model server
    Local,
    /// General-purpose cloud model
    Cloud,
}

impl BackendKind {
    /// Selection priority, highest first.
    pub const PRIORITY: [BackendKind; 4] = [
        BackendKind::Remote,
        BackendKind::Hosted,
        BackendKind::Local,
        BackendKind::Cloud,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Remote => "remote",
            BackendKind::Hosted => "hosted",
            BackendKind::Local => "local",
            BackendKind::Cloud => "cloud",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote fine-tuned model endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBackendSettings {
    pub url: String,
    #[serde(default = "default_rpm")]
    pub requests_per_minute: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Hosted inference API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedBackendSettings {
    pub token: String,
    #[serde(default = "HostedBackendSettings::default_model")]
    pub model_id: String,
    #[serde(default = "HostedBackendSettings::default_base_url")]
    pub base_url: String,
    #[serde(default = "default_rpm")]
    pub requests_per_minute: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl HostedBackendSettings {
    fn default_model() -> String {
        DEFAULT_HOSTED_MODEL.to_string()
    }

    fn default_base_url() -> String {
        DEFAULT_HOSTED_BASE_URL.to_string()
    }
}

/// Local model server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBackendSettings {
    #[serde(default = "LocalBackendSettings::default_base_url")]
    pub base_url: String,
    #[serde(default = "LocalBackendSettings::default_model")]
    pub model: String,
    #[serde(default = "default_rpm")]
    pub requests_per_minute: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LocalBackendSettings {
    fn default_base_url() -> String {
        DEFAULT_LOCAL_BASE_URL.to_string()
    }

    fn default_model() -> String {
        DEFAULT_LOCAL_MODEL.to_string()
    }
}

/// General-purpose cloud model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudBackendSettings {
    pub api_key: String,
    #[serde(default = "CloudBackendSettings::default_model")]
    pub model: String,
    #[serde(default = "CloudBackendSettings::default_base_url")]
    pub base_url: String,
    #[serde(default = "default_rpm")]
    pub requests_per_minute: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CloudBackendSettings {
    fn default_model() -> String {
        DEFAULT_CLOUD_MODEL.to_string()
    }

    fn default_base_url() -> String {
        DEFAULT_CLOUD_BASE_URL.to_string()
    }
}

/// Every backend the process may use. Unset entries are disabled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub remote: Option<RemoteBackendSettings>,
    #[serde(default)]
    pub hosted: Option<HostedBackendSettings>,
    #[serde(default)]
    pub local: Option<LocalBackendSettings>,
    #[serde(default)]
    pub cloud: Option<CloudBackendSettings>,
}

impl BackendSettings {
    /// Whether a given backend has settings.
    pub fn is_configured(&self, kind: BackendKind) -> bool {
        match kind {
            BackendKind::Remote => self.remote.is_some(),
            BackendKind::Hosted => self.hosted.is_some(),
            BackendKind::Local => self.local.is_some(),
            BackendKind::Cloud => self.cloud.is_some(),
        }
    }

    /// The first configured backend in priority order, if any.
    pub fn active_kind(&self) -> Option<BackendKind> {
        BackendKind::PRIORITY
            .into_iter()
            .find(|kind| self.is_configured(*kind))
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// What to do when extracting one witness's events fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionFailurePolicy {
    /// Log and continue with zero events for that witness
    #[default]
    DegradeToEmpty,
    /// Abort the whole analysis
    FailFast,
}

impl ExtractionFailurePolicy {
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "degrade" | "degrade_to_empty" => Some(Self::DegradeToEmpty),
            "fail" | "fail_fast" => Some(Self::FailFast),
            _ => None,
        }
    }
}

/// Orchestration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Comparisons in flight at once. 1 keeps the sweep strictly serial.
    #[serde(default = "EngineSettings::default_concurrency")]
    pub comparison_concurrency: usize,
    #[serde(default)]
    pub extraction_failure_policy: ExtractionFailurePolicy,
    /// Language used when detection fails.
    #[serde(default = "EngineSettings::default_fallback_language")]
    pub fallback_language: String,
}

impl EngineSettings {
    fn default_concurrency() -> usize {
        1
    }

    fn default_fallback_language() -> String {
        DEFAULT_FALLBACK_LANGUAGE.to_string()
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            comparison_concurrency: Self::default_concurrency(),
            extraction_failure_policy: ExtractionFailurePolicy::default(),
            fallback_language: Self::default_fallback_language(),
        }
    }
}

// ============================================================================
// MASTER CONFIG
// ============================================================================

/// Master configuration struct.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SakshyaConfig {
    #[serde(default)]
    pub backends: BackendSettings,
    #[serde(default)]
    pub engine: EngineSettings,
}

impl SakshyaConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `SAKSHYA_REMOTE_URL`: enables the remote fine-tuned backend
    /// - `SAKSHYA_HF_TOKEN` (or `HF_TOKEN`): enables the hosted inference API
    /// - `SAKSHYA_HF_MODEL`: hosted model id (default: Qwen/Qwen2.5-7B-Instruct)
    /// - `SAKSHYA_OLLAMA_URL`: enables the local backend
    /// - `SAKSHYA_OLLAMA_MODEL`: local model name
    /// - `GEMINI_API_KEY`: enables the cloud backend
    /// - `SAKSHYA_GEMINI_MODEL`: cloud model name
    /// - `SAKSHYA_REQUESTS_PER_MINUTE`: rate limit for every backend (default: 60)
    /// - `SAKSHYA_BACKEND_TIMEOUT_SECS`: per-request timeout (default: 600)
    /// - `SAKSHYA_COMPARISON_CONCURRENCY`: comparisons in flight (default: 1)
    /// - `SAKSHYA_EXTRACTION_FAILURE_POLICY`: `degrade` or `fail_fast`
    /// - `SAKSHYA_FALLBACK_LANGUAGE`: language when detection fails (default: en)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rpm = get("SAKSHYA_REQUESTS_PER_MINUTE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_REQUESTS_PER_MINUTE);
        let timeout_secs = get("SAKSHYA_BACKEND_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_BACKEND_TIMEOUT_SECS);

        let remote = get("SAKSHYA_REMOTE_URL").map(|url| RemoteBackendSettings {
            url,
            requests_per_minute: rpm,
            timeout_secs,
        });

        let hosted = get("SAKSHYA_HF_TOKEN")
            .or_else(|| get("HF_TOKEN"))
            .map(|token| HostedBackendSettings {
                token,
                model_id: get("SAKSHYA_HF_MODEL")
                    .unwrap_or_else(HostedBackendSettings::default_model),
                base_url: HostedBackendSettings::default_base_url(),
                requests_per_minute: rpm,
                timeout_secs,
            });

        let local = get("SAKSHYA_OLLAMA_URL").map(|base_url| LocalBackendSettings {
            base_url,
            model: get("SAKSHYA_OLLAMA_MODEL").unwrap_or_else(LocalBackendSettings::default_model),
            requests_per_minute: rpm,
            timeout_secs,
        });

        let cloud = get("GEMINI_API_KEY").map(|api_key| CloudBackendSettings {
            api_key,
            model: get("SAKSHYA_GEMINI_MODEL").unwrap_or_else(CloudBackendSettings::default_model),
            base_url: CloudBackendSettings::default_base_url(),
            requests_per_minute: rpm,
            timeout_secs,
        });

        let defaults = EngineSettings::default();
        let engine = EngineSettings {
            comparison_concurrency: get("SAKSHYA_COMPARISON_CONCURRENCY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.comparison_concurrency),
            extraction_failure_policy: get("SAKSHYA_EXTRACTION_FAILURE_POLICY")
                .and_then(|s| ExtractionFailurePolicy::from_label(&s))
                .unwrap_or(defaults.extraction_failure_policy),
            fallback_language: get("SAKSHYA_FALLBACK_LANGUAGE")
                .unwrap_or(defaults.fallback_language),
        };

        Self {
            backends: BackendSettings {
                remote,
                hosted,
                local,
                cloud,
            },
            engine,
        }
    }

    /// Parse a TOML document. Missing sections take their defaults.
    pub fn from_toml_str(s: &str) -> SakshyaResult<Self> {
        toml::from_str(s).map_err(|e| {
            ConfigError::Parse {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(SakshyaError::Config) if invalid.
    pub fn validate(&self) -> SakshyaResult<()> {
        if self.engine.comparison_concurrency == 0 {
            return Err(invalid(
                "engine.comparison_concurrency",
                "0",
                "comparison_concurrency must be at least 1",
            ));
        }

        if self.engine.fallback_language.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "engine.fallback_language".to_string(),
            }
            .into());
        }

        if let Some(remote) = &self.backends.remote {
            require_non_empty("backends.remote.url", &remote.url)?;
            check_limits("backends.remote", remote.requests_per_minute, remote.timeout_secs)?;
        }

        if let Some(hosted) = &self.backends.hosted {
            require_non_empty("backends.hosted.token", &hosted.token)?;
            require_non_empty("backends.hosted.model_id", &hosted.model_id)?;
            require_non_empty("backends.hosted.base_url", &hosted.base_url)?;
            check_limits("backends.hosted", hosted.requests_per_minute, hosted.timeout_secs)?;
        }

        if let Some(local) = &self.backends.local {
            require_non_empty("backends.local.base_url", &local.base_url)?;
            require_non_empty("backends.local.model", &local.model)?;
            check_limits("backends.local", local.requests_per_minute, local.timeout_secs)?;
        }

        if let Some(cloud) = &self.backends.cloud {
            require_non_empty("backends.cloud.api_key", &cloud.api_key)?;
            require_non_empty("backends.cloud.model", &cloud.model)?;
            require_non_empty("backends.cloud.base_url", &cloud.base_url)?;
            check_limits("backends.cloud", cloud.requests_per_minute, cloud.timeout_secs)?;
        }

        Ok(())
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> crate::SakshyaError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn require_non_empty(field: &str, value: &str) -> SakshyaResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingRequired {
            field: field.to_string(),
        }
        .into());
    }
    Ok(())
}

fn check_limits(prefix: &str, requests_per_minute: u32, timeout_secs: u64) -> SakshyaResult<()> {
    if requests_per_minute == 0 {
        return Err(invalid(
            &format!("{}.requests_per_minute", prefix),
            "0",
            "requests_per_minute must be greater than 0",
        ));
    }
    if timeout_secs == 0 {
        return Err(invalid(
            &format!("{}.timeout_secs", prefix),
            "0",
            "timeout_secs must be positive",
        ));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SakshyaError;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_has_no_backend() {
        let config = SakshyaConfig::from_lookup(lookup(&[]));
        assert_eq!(config.backends.active_kind(), None);
        assert_eq!(config.engine, EngineSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_priority_remote_beats_everything() {
        let config = SakshyaConfig::from_lookup(lookup(&[
            ("SAKSHYA_REMOTE_URL", "https://gpu.example/generate"),
            ("HF_TOKEN", "hf_x"),
            ("SAKSHYA_OLLAMA_URL", "http://localhost:11434"),
            ("GEMINI_API_KEY", "g"),
        ]));
        assert_eq!(config.backends.active_kind(), Some(BackendKind::Remote));
    }

    #[test]
    fn test_priority_falls_through_in_order() {
        let hosted_and_cloud =
            SakshyaConfig::from_lookup(lookup(&[("HF_TOKEN", "hf_x"), ("GEMINI_API_KEY", "g")]));
        assert_eq!(
            hosted_and_cloud.backends.active_kind(),
            Some(BackendKind::Hosted)
        );

        let local_and_cloud = SakshyaConfig::from_lookup(lookup(&[
            ("SAKSHYA_OLLAMA_URL", "http://localhost:11434"),
            ("GEMINI_API_KEY", "g"),
        ]));
        assert_eq!(local_and_cloud.backends.active_kind(), Some(BackendKind::Local));

        let cloud_only = SakshyaConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "g")]));
        assert_eq!(cloud_only.backends.active_kind(), Some(BackendKind::Cloud));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = SakshyaConfig::from_lookup(lookup(&[
            ("SAKSHYA_REMOTE_URL", "   "),
            ("GEMINI_API_KEY", ""),
        ]));
        assert_eq!(config.backends.active_kind(), None);
    }

    #[test]
    fn test_engine_settings_from_lookup() {
        let config = SakshyaConfig::from_lookup(lookup(&[
            ("SAKSHYA_COMPARISON_CONCURRENCY", "4"),
            ("SAKSHYA_EXTRACTION_FAILURE_POLICY", "fail-fast"),
            ("SAKSHYA_FALLBACK_LANGUAGE", "ml"),
            ("SAKSHYA_REQUESTS_PER_MINUTE", "not-a-number"),
            ("SAKSHYA_REMOTE_URL", "https://gpu.example"),
        ]));
        assert_eq!(config.engine.comparison_concurrency, 4);
        assert_eq!(
            config.engine.extraction_failure_policy,
            ExtractionFailurePolicy::FailFast
        );
        assert_eq!(config.engine.fallback_language, "ml");
        let remote = config.backends.remote.unwrap();
        assert_eq!(remote.requests_per_minute, DEFAULT_REQUESTS_PER_MINUTE);
        assert_eq!(remote.timeout_secs, DEFAULT_BACKEND_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_toml_with_defaults() {
        let config = SakshyaConfig::from_toml_str(
            r#"
            [backends.hosted]
            token = "hf_abc"

            [engine]
            comparison_concurrency = 2
            "#,
        )
        .unwrap();
        let hosted = config.backends.hosted.as_ref().unwrap();
        assert_eq!(hosted.model_id, DEFAULT_HOSTED_MODEL);
        assert_eq!(hosted.base_url, DEFAULT_HOSTED_BASE_URL);
        assert_eq!(config.engine.comparison_concurrency, 2);
        assert_eq!(config.engine.fallback_language, DEFAULT_FALLBACK_LANGUAGE);
        assert_eq!(config.backends.active_kind(), Some(BackendKind::Hosted));
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        let err = SakshyaConfig::from_toml_str("backends = 3").unwrap_err();
        assert!(matches!(err, SakshyaError::Config(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let mut config = SakshyaConfig::default();
        config.engine.comparison_concurrency = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            SakshyaError::Config(ConfigError::InvalidValue { ref field, .. })
                if field == "engine.comparison_concurrency"
        ));
    }

    #[test]
    fn test_validate_backend_limits() {
        let mut config = SakshyaConfig::default();
        config.backends.local = Some(LocalBackendSettings {
            base_url: DEFAULT_LOCAL_BASE_URL.to_string(),
            model: DEFAULT_LOCAL_MODEL.to_string(),
            requests_per_minute: 0,
            timeout_secs: 10,
        });
        assert!(config.validate().is_err());

        config.backends.local = None;
        config.backends.cloud = Some(CloudBackendSettings {
            api_key: " ".to_string(),
            model: DEFAULT_CLOUD_MODEL.to_string(),
            base_url: DEFAULT_CLOUD_BASE_URL.to_string(),
            requests_per_minute: 60,
            timeout_secs: 10,
        });
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            SakshyaError::Config(ConfigError::MissingRequired { ref field })
                if field == "backends.cloud.api_key"
        ));
    }
}
