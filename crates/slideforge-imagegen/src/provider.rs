//! Provider adapter trait and shared wire-level classification
//!
//! One adapter per backend translates an `ImagePrompt` + `ProviderConfig`
//! into provider-specific calls. Adapters never retry whole generations
//! themselves; they raise classified errors and let the retry orchestrator
//! decide.

use crate::config::{ProviderConfig, ProviderId, ProviderParams};
use crate::http::{HttpClient, HttpResponse, TransportError};
use crate::prompt::ImagePrompt;
use serde_json::Value;
use slideforge_core::{ClassifiedError, Result};
use std::time::Duration;

/// Everything an adapter invocation needs besides the prompt and config.
/// Owned per attempt; the sleep hook exists so tests can run poll loops
/// without wall-clock delays.
pub struct GenerateContext<'a> {
    pub http: &'a dyn HttpClient,
    pub params: &'a ProviderParams,
    /// Injected seed for providers that accept one; echoed back in results
    pub seed: Option<u64>,
    pub sleep: &'a dyn Fn(Duration),
}

impl<'a> GenerateContext<'a> {
    /// Hard wall-clock timeout for a single HTTP call
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.params.timeout_secs)
    }
}

/// What a successful adapter invocation yields
#[derive(Debug, Clone)]
pub struct ProviderOutput {
    /// URL of the finished image
    pub image_url: String,
    /// Inline image bytes, when the provider returned them instead of
    /// (or alongside) a URL
    pub image_base64: Option<String>,
    /// The model that actually served the request
    pub model_used: String,
    /// Seed reported or echoed by the provider
    pub seed: Option<u64>,
}

/// Trait implemented by each image generation backend
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter serves
    fn id(&self) -> ProviderId;

    /// One full generation attempt: request, optional poll loop, result
    /// extraction. Fails with a classified error.
    fn generate(
        &self,
        ctx: &GenerateContext<'_>,
        prompt: &ImagePrompt,
        config: &ProviderConfig,
    ) -> Result<ProviderOutput>;
}

/// Map a below-HTTP transport failure onto the taxonomy. Both timeouts and
/// connection-level failures guard the same hang/flake mode, so both are
/// retryable.
pub(crate) fn classify_transport(provider: ProviderId, e: TransportError) -> ClassifiedError {
    match e {
        TransportError::Timeout(m) => ClassifiedError::request_timeout(provider.as_str(), m),
        TransportError::Network(m) => ClassifiedError::request_timeout(
            provider.as_str(),
            format!("network failure: {}", m),
        ),
    }
}

/// Reject non-2xx responses with a status-classified error
pub(crate) fn check_status(provider: ProviderId, response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let message = error_message(&response.body)
        .unwrap_or_else(|| format!("HTTP {} from {}", response.status, provider));
    tracing::warn!(
        provider = provider.as_str(),
        status = response.status,
        "provider returned error status"
    );
    Err(ClassifiedError::http(
        provider.as_str(),
        response.status,
        message,
    ))
}

/// Pull a human-readable error message out of a provider error body.
/// Providers disagree on the field name.
pub(crate) fn error_message(body: &Value) -> Option<String> {
    for key in ["error", "detail", "message"] {
        if let Some(value) = body.get(key) {
            if let Some(s) = value.as_str() {
                return Some(s.to_string());
            }
            if let Some(s) = value.get("message").and_then(Value::as_str) {
                return Some(s.to_string());
            }
        }
    }
    body.as_str().map(|s| truncate(s, 200))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_status_passes_2xx() {
        let response = HttpResponse {
            status: 201,
            body: json!({}),
        };
        assert!(check_status(ProviderId::Fal, &response).is_ok());
    }

    #[test]
    fn test_check_status_classifies_429_retryable() {
        let response = HttpResponse {
            status: 429,
            body: json!({"error": "rate limit exceeded"}),
        };
        let err = check_status(ProviderId::Together, &response).unwrap_err();
        assert!(err.retryable);
        assert!(err.message.contains("rate limit"));
    }

    #[test]
    fn test_check_status_classifies_401_fatal() {
        let response = HttpResponse {
            status: 401,
            body: json!({"detail": "invalid token"}),
        };
        let err = check_status(ProviderId::Replicate, &response).unwrap_err();
        assert!(!err.retryable);
        assert_eq!(err.provider, "replicate");
    }

    #[test]
    fn test_error_message_variants() {
        assert_eq!(
            error_message(&json!({"error": {"message": "boom"}})).as_deref(),
            Some("boom")
        );
        assert_eq!(
            error_message(&json!({"message": "plain"})).as_deref(),
            Some("plain")
        );
        assert_eq!(error_message(&json!({"unrelated": 1})), None);
    }

    #[test]
    fn test_transport_classification_is_retryable() {
        let timeout = classify_transport(
            ProviderId::Bfl,
            TransportError::Timeout("deadline elapsed".to_string()),
        );
        assert!(timeout.retryable);
        assert_eq!(timeout.code, slideforge_core::ErrorCode::RequestTimeout);

        let network = classify_transport(
            ProviderId::Bfl,
            TransportError::Network("connection refused".to_string()),
        );
        assert!(network.retryable);
        assert!(network.message.contains("connection refused"));
    }
}
