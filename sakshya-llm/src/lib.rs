//! SAKSHYA LLM - Classification backends
//!
//! The [`Classifier`] trait every backend implements, the comparison cache,
//! prompt templates, response parsing, and the HTTP adapters for each
//! supported backend.

pub mod cache;
pub mod prompts;
pub mod providers;
pub mod response;

pub use cache::{CacheKey, CacheStats, ComparisonCache, InMemoryComparisonCache};
pub use providers::select_classifier;
pub use response::{parse_verdict, strip_code_fence, ResponseParseError, DEFAULT_EXPLANATION};

use async_trait::async_trait;
use sakshya_core::{SakshyaError, SakshyaResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// A text-generation backend consulted for non-trivial comparisons.
/// Implementations must be thread-safe (Send + Sync).
///
/// # Example
/// ```ignore
/// struct MyBackend { /* ... */ }
///
/// #[async_trait]
/// impl Classifier for MyBackend {
///     fn provider_id(&self) -> &str { "mine" }
///     async fn generate(&self, prompt: &str) -> SakshyaResult<String> {
///         // Call the model
///     }
/// }
/// ```
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short name used in logs.
    fn provider_id(&self) -> &str;

    /// Generate raw text for a prompt.
    ///
    /// # Returns
    /// * `Ok(String)` - Raw model output, possibly fenced JSON
    /// * `Err(SakshyaError::Llm)` - Network, timeout, or non-2xx failure
    async fn generate(&self, prompt: &str) -> SakshyaResult<String>;
}

// ============================================================================
// MOCK CLASSIFIER FOR TESTING
// ============================================================================

type Responder = dyn Fn(&str) -> SakshyaResult<String> + Send + Sync;

/// Scripted classifier for tests. Records every prompt it receives.
#[derive(Clone)]
pub struct MockClassifier {
    responder: Arc<Responder>,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockClassifier {
    /// Answer every prompt with the same text.
    pub fn responding(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::from_fn(move |_| Ok(text.clone()))
    }

    /// Fail every call with the given error.
    pub fn failing(error: impl Into<SakshyaError>) -> Self {
        let error = error.into();
        Self::from_fn(move |_| Err(error.clone()))
    }

    /// Answer with a function of the prompt.
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str) -> SakshyaResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn provider_id(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> SakshyaResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        (self.responder)(prompt)
    }
}

impl std::fmt::Debug for MockClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockClassifier")
            .field("calls", &self.calls())
            .finish()
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
