//! Classification backend implementations
//!
//! One HTTP adapter per supported backend, plus the selection function that
//! picks the active one from configuration.

pub mod client;
pub mod cloud;
pub mod hosted;
pub mod local;
pub mod remote;
pub mod types;

pub use client::HttpClient;
pub use cloud::CloudClassifier;
pub use hosted::HostedClassifier;
pub use local::LocalClassifier;
pub use remote::RemoteClassifier;

use crate::Classifier;
use sakshya_core::{BackendKind, BackendSettings, LlmError, SakshyaError};
use std::sync::Arc;

pub(crate) fn request_failed(
    provider: &str,
    status: i32,
    message: impl Into<String>,
) -> SakshyaError {
    LlmError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    }
    .into()
}

pub(crate) fn rate_limited(provider: &str, retry_after_ms: i64) -> SakshyaError {
    LlmError::RateLimited {
        provider: provider.to_string(),
        retry_after_ms,
    }
    .into()
}

pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> SakshyaError {
    LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    }
    .into()
}

/// Build the active classifier: the first configured backend in
/// [`BackendKind::PRIORITY`] order. `None` means no backend is configured,
/// which is a valid offline mode.
///
/// Call once at startup and share the result.
pub fn select_classifier(settings: &BackendSettings) -> Option<Arc<dyn Classifier>> {
    let kind = settings.active_kind()?;
    let classifier: Arc<dyn Classifier> = match kind {
        BackendKind::Remote => Arc::new(RemoteClassifier::new(settings.remote.as_ref()?)),
        BackendKind::Hosted => Arc::new(HostedClassifier::new(settings.hosted.as_ref()?)),
        BackendKind::Local => Arc::new(LocalClassifier::new(settings.local.as_ref()?)),
        BackendKind::Cloud => Arc::new(CloudClassifier::new(settings.cloud.as_ref()?)),
    };
    tracing::info!(backend = %kind, "Selected classification backend");
    Some(classifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sakshya_core::{
        CloudBackendSettings, HostedBackendSettings, LocalBackendSettings, RemoteBackendSettings,
    };

    fn all_backends() -> BackendSettings {
        BackendSettings {
            remote: Some(RemoteBackendSettings {
                url: "https://gpu.example/generate".to_string(),
                requests_per_minute: 60,
                timeout_secs: 600,
            }),
            hosted: Some(HostedBackendSettings {
                token: "hf".to_string(),
                model_id: "org/model".to_string(),
                base_url: "https://router.example".to_string(),
                requests_per_minute: 60,
                timeout_secs: 60,
            }),
            local: Some(LocalBackendSettings {
                base_url: "http://localhost:11434".to_string(),
                model: "m".to_string(),
                requests_per_minute: 60,
                timeout_secs: 60,
            }),
            cloud: Some(CloudBackendSettings {
                api_key: "k".to_string(),
                model: "g".to_string(),
                base_url: "https://cloud.example".to_string(),
                requests_per_minute: 60,
                timeout_secs: 60,
            }),
        }
    }

    #[test]
    fn test_select_none_when_unconfigured() {
        assert!(select_classifier(&BackendSettings::default()).is_none());
    }

    #[test]
    fn test_select_follows_priority() {
        let mut settings = all_backends();
        assert_eq!(select_classifier(&settings).unwrap().provider_id(), "remote");

        settings.remote = None;
        assert_eq!(select_classifier(&settings).unwrap().provider_id(), "hosted");

        settings.hosted = None;
        assert_eq!(select_classifier(&settings).unwrap().provider_id(), "local");

        settings.local = None;
        assert_eq!(select_classifier(&settings).unwrap().provider_id(), "cloud");
    }

    #[test]
    fn test_error_helpers() {
        assert!(matches!(
            request_failed("remote", 500, "boom"),
            SakshyaError::Llm(LlmError::RequestFailed { status: 500, .. })
        ));
        assert!(matches!(
            rate_limited("hosted", 10),
            SakshyaError::Llm(LlmError::RateLimited { retry_after_ms: 10, .. })
        ));
        assert!(matches!(
            invalid_response("cloud", "empty"),
            SakshyaError::Llm(LlmError::InvalidResponse { .. })
        ));
    }
}
