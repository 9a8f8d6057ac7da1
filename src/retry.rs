use crate::error::{PipelineError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

/// Retry schedule for one logical request: up to `max_retries` additional
/// attempts after the first, exponential backoff between attempts, and a
/// per-attempt timeout that aborts the in-flight call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub const fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay inserted after attempt `attempt` (0-indexed): base × 2^attempt.
    /// No cap and no jitter; saturates instead of overflowing.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// One HTTP request, fully described up front. Immutable once built.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn with_bearer_auth(mut self, token: &str) -> Result<Self> {
        let value = format!("Bearer {}", token)
            .parse()
            .map_err(|_| PipelineError::RequestError("API key contains invalid characters".into()))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    pub fn with_json_body(mut self, body: &Value) -> Result<Self> {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(
            serde_json::to_string(body)
                .map_err(|e| PipelineError::SerializationError(e.to_string()))?,
        );
        Ok(self)
    }
}

/// A successfully completed request: 2xx status and a parsed JSON body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Issues a request with sequential retries. At most one transport call and
/// one pending sleep exist at any instant per `send`.
#[derive(Clone)]
pub struct RetryingRequester {
    client: Client,
}

impl RetryingRequester {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Returns the first successful response, or the terminal error after
    /// all attempts are exhausted. HTTP-status failures and transport
    /// failures share one error channel, distinguished only by message.
    pub async fn send(&self, spec: &RequestSpec, policy: &RetryPolicy) -> Result<ApiResponse> {
        let mut last_error: Option<PipelineError> = None;

        for attempt in 0..=policy.max_retries {
            match self.dispatch(spec, policy.timeout).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if attempt < policy.max_retries {
                        let delay = policy.delay_for(attempt);
                        log::warn!(
                            "Request failed (attempt {}/{}): {}, retrying in {}ms...",
                            attempt + 1,
                            policy.max_retries + 1,
                            err.message(),
                            delay.as_millis()
                        );
                        sleep(delay).await;
                    } else {
                        last_error = Some(err);
                    }
                }
            }
        }

        // The final iteration always records an error before the loop ends.
        Err(last_error.unwrap_or_else(|| PipelineError::RequestError("request failed".into())))
    }

    async fn dispatch(&self, spec: &RequestSpec, timeout: Duration) -> Result<ApiResponse> {
        let mut request = self
            .client
            .request(spec.method.clone(), &spec.url)
            .headers(spec.headers.clone())
            .timeout(timeout);
        if let Some(body) = &spec.body {
            request = request.body(body.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| PipelineError::RequestError(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();

        if status.is_success() {
            // An unparseable success body counts as a transport failure and
            // goes back through the retry loop.
            let body = response
                .json::<Value>()
                .await
                .map_err(|e| PipelineError::RequestError(format!("invalid response body: {}", e)))?;
            return Ok(ApiResponse {
                status: status.as_u16(),
                headers,
                body,
            });
        }

        let body = response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| serde_json::json!({}));
        Err(PipelineError::RequestError(extract_error_message(
            &body,
            status.as_u16(),
        )))
    }
}

impl Default for RetryingRequester {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort message out of an error body: the nested `error.message`
/// wins, then a top-level `message`, then the bare status code.
fn extract_error_message(body: &Value, status: u16) -> String {
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status))
}
