//! Rate-limited HTTP client shared by every backend

use super::{invalid_response, rate_limited, request_failed};
use reqwest::{Client, StatusCode};
use sakshya_core::{LlmError, SakshyaError, SakshyaResult};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// HTTP client with a request budget and a per-request deadline.
pub struct HttpClient {
    client: Client,
    provider: &'static str,
    rate_limiter: Arc<Semaphore>,
    /// Earliest offset from `start_time` at which the next request may go.
    next_slot_ms: AtomicU64,
    min_request_interval_ms: u64,
    start_time: Instant,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `provider` - Name used in errors and logs
    /// * `requests_per_minute` - Request budget; also bounds requests in flight
    /// * `timeout` - Deadline for each request, surfaced as [`LlmError::Timeout`]
    pub fn new(provider: &'static str, requests_per_minute: u32, timeout: Duration) -> Self {
        let rpm = requests_per_minute.max(1);
        let min_interval_ms = (60_000 / rpm as u64).max(10);

        Self {
            client: Client::new(),
            provider,
            rate_limiter: Arc::new(Semaphore::new(rpm as usize)),
            next_slot_ms: AtomicU64::new(0),
            min_request_interval_ms: min_interval_ms,
            start_time: Instant::now(),
            timeout,
        }
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// Claim the next send slot and return how long to wait for it.
    fn reserve_slot(&self) -> Duration {
        let now_ms = self.start_time.elapsed().as_millis() as u64;
        Duration::from_millis(self.claim_slot(now_ms) - now_ms)
    }

    /// Claim the first free slot at or after `now_ms`. Slots are spaced
    /// `min_request_interval_ms` apart and claimed with a single atomic
    /// update, so concurrent callers never share one.
    fn claim_slot(&self, now_ms: u64) -> u64 {
        let interval = self.min_request_interval_ms;
        let previous = self
            .next_slot_ms
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                Some(next.max(now_ms) + interval)
            })
            .unwrap_or_else(|next| next);
        previous.max(now_ms)
    }

    /// POST a JSON body and decode a JSON response, with rate limiting.
    pub async fn post_json<Req: Serialize, Res: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Req,
    ) -> SakshyaResult<Res> {
        let _permit = self.rate_limiter.acquire().await.map_err(|e| {
            request_failed(self.provider, 0, format!("Rate limiter error: {}", e))
        })?;

        let wait = self.reserve_slot();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        let mut request = self
            .client
            .post(url)
            .timeout(self.timeout)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        tracing::debug!(provider = self.provider, "Sending classification request");

        let response = request.json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                SakshyaError::from(LlmError::Timeout {
                    provider: self.provider.to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            } else {
                request_failed(self.provider, 0, format!("HTTP request failed: {}", e))
            }
        })?;

        let status = response.status();
        let retry_after_ms = parse_retry_after_ms(response.headers()).unwrap_or(0);

        if status.is_success() {
            return response.json().await.map_err(|e| {
                invalid_response(self.provider, format!("Failed to parse response: {}", e))
            });
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let error_msg = error_message(&error_text);

        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => rate_limited(self.provider, retry_after_ms),
            StatusCode::SERVICE_UNAVAILABLE if error_msg.contains("currently loading") => {
                SakshyaError::from(LlmError::ModelLoading {
                    provider: self.provider.to_string(),
                    message: error_msg,
                })
            }
            _ => request_failed(self.provider, status.as_u16() as i32, error_msg),
        })
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"error": "..."}` and `{"error": {"message": "..."}}`;
/// anything else is returned as-is.
pub(crate) fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| match v.get("error") {
        Some(Value::String(msg)) => Some(msg.clone()),
        Some(Value::Object(obj)) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    });
    message.unwrap_or_else(|| body.to_string())
}

fn parse_retry_after_ms(headers: &reqwest::header::HeaderMap) -> Option<i64> {
    headers
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<f64>().ok())
        .map(|seconds| (seconds * 1000.0) as i64)
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("provider", &self.provider)
            .field("min_request_interval_ms", &self.min_request_interval_ms)
            .field("timeout", &self.timeout)
            .finish()
    }
}
