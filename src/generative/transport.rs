//! Transport seam between the client and the remote service.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::config::GeminiSettings;
use crate::error::{Error, Result};

use super::wire::{error_message, GenerateContentRequest, GenerateContentResponse};

/// One outbound model invocation
#[derive(Clone)]
pub struct ModelCall {
    pub model: String,
    pub api_key: String,
    pub request: GenerateContentRequest,
}

impl fmt::Debug for ModelCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelCall")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("request", &self.request)
            .finish()
    }
}

/// Text the model produced. Empty when the reply carried none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteResponse {
    text: String,
}

impl RemoteResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Performs model calls
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logs
    fn name(&self) -> &'static str;

    async fn generate_content(&self, call: &ModelCall) -> Result<RemoteResponse>;
}

// ─────────────────────────────────────────────────────────────────
// HTTP Transport
// ─────────────────────────────────────────────────────────────────

/// Gemini REST transport over reqwest
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    /// Build a transport. `timeout_secs == 0` disables the request timeout.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let mut builder = Client::builder();
        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_settings(settings: &GeminiSettings) -> Result<Self> {
        Self::new(&settings.base_url, settings.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/models/{model}:generateContent`
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn generate_content(&self, call: &ModelCall) -> Result<RemoteResponse> {
        let url = self.endpoint(&call.model);
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &call.api_key)
            .json(&call.request)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Request to model service failed");
                Error::Network {
                    url: url.clone(),
                    message: e.to_string(),
                    timed_out: e.is_timeout(),
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::Network {
            url: url.clone(),
            message: format!("failed to read response body: {}", e),
            timed_out: e.is_timeout(),
        })?;

        debug!(
            model = %call.model,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model service responded"
        );

        if !status.is_success() {
            return Err(map_http_error(status, &call.model, &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| Error::upstream_malformed(format!("response body is not valid JSON: {}", e)))?;

        Ok(RemoteResponse::new(parsed.text()))
    }
}

fn map_http_error(status: StatusCode, model: &str, body: &str) -> Error {
    let message = error_message(body);
    warn!(status = status.as_u16(), model, message = %message, "Model service rejected request");

    if status == StatusCode::NOT_FOUND {
        Error::ModelUnavailable {
            model: model.to_string(),
            message,
        }
    } else {
        Error::UpstreamRejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let transport = HttpTransport::new("https://example.test/v1beta/", 0).unwrap();
        assert_eq!(transport.base_url(), "https://example.test/v1beta");
        assert_eq!(
            transport.endpoint("gemini-3-flash-preview"),
            "https://example.test/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[test]
    fn test_not_found_names_model() {
        let err = map_http_error(
            StatusCode::NOT_FOUND,
            "gemini-unknown",
            r#"{"error":{"code":404,"message":"not found","status":"NOT_FOUND"}}"#,
        );
        assert!(matches!(err, Error::ModelUnavailable { .. }));
        assert!(err.to_string().contains("gemini-unknown"));
    }

    #[test]
    fn test_status_mapping() {
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, "m", "slow down");
        assert!(matches!(err, Error::UpstreamRejected { status: 429, .. }));
        assert!(err.is_retryable());

        let err = map_http_error(StatusCode::BAD_REQUEST, "m", "{}");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_model_call_debug_redacts_key() {
        let call = ModelCall {
            model: "m".to_string(),
            api_key: "super-secret".to_string(),
            request: GenerateContentRequest::user(vec![]),
        };
        assert!(!format!("{:?}", call).contains("super-secret"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        // Port 9 on localhost is not expected to accept connections
        let transport = HttpTransport::new("http://127.0.0.1:9", 5).unwrap();
        let call = ModelCall {
            model: "m".to_string(),
            api_key: "k".to_string(),
            request: GenerateContentRequest::user(vec![]),
        };
        let err = transport.generate_content(&call).await.unwrap_err();
        assert!(matches!(err, Error::Network { .. }));
        assert!(err.is_retryable());
    }
}
