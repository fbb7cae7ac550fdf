//! Classified error type shared across the generation pipeline
//!
//! Every failure that crosses a component boundary carries an `ErrorCode`
//! and a `retryable` flag. The retry orchestrator is the only consumer of
//! the flag; everything else just propagates.

use std::fmt;
use thiserror::Error;

/// Error taxonomy for the generation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Configuration is invalid (missing key, malformed model string).
    /// No network request was made.
    ConfigInvalid,
    /// Provider id does not name a known backend
    UnknownProvider,
    /// Non-2xx HTTP response from a provider endpoint
    Http(u16),
    /// Provider explicitly reported the job as failed
    ProviderFailure,
    /// Provider reported the job as canceled
    ProviderCanceled,
    /// Polling never reached a terminal state within the attempt budget
    PollTimeout,
    /// A single HTTP call exceeded its wall-clock timeout
    RequestTimeout,
    /// All retries spent; wraps the last attempt's failure
    Exhausted,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::ConfigInvalid => write!(f, "config_invalid"),
            ErrorCode::UnknownProvider => write!(f, "unknown_provider"),
            ErrorCode::Http(status) => write!(f, "http_{}", status),
            ErrorCode::ProviderFailure => write!(f, "provider_failure"),
            ErrorCode::ProviderCanceled => write!(f, "provider_canceled"),
            ErrorCode::PollTimeout => write!(f, "poll_timeout"),
            ErrorCode::RequestTimeout => write!(f, "request_timeout"),
            ErrorCode::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// A classified generation error
///
/// Constructed through the associated functions below so the `retryable`
/// flag always matches the taxonomy: 429 and 5xx are retryable, other 4xx
/// are not; timeouts (request or poll budget) are retryable; provider-
/// reported failure/cancellation and configuration errors are fatal.
#[derive(Debug, Clone, Error)]
#[error("[{provider}/{code}] {message}")]
pub struct ClassifiedError {
    /// Human-readable description assembled from the failing layer
    pub message: String,
    /// Provider name, or "config" for pre-network failures
    pub provider: String,
    /// Taxonomy code
    pub code: ErrorCode,
    /// Whether the retry orchestrator may attempt again
    pub retryable: bool,
}

impl ClassifiedError {
    /// Invalid configuration; raised before any network call
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            provider: "config".to_string(),
            code: ErrorCode::ConfigInvalid,
            retryable: false,
        }
    }

    /// Provider id does not match any registered backend
    pub fn unknown_provider(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message: format!("unknown provider '{}'", name),
            provider: "config".to_string(),
            code: ErrorCode::UnknownProvider,
            retryable: false,
        }
    }

    /// Non-2xx HTTP response; retryable iff 429 or 5xx
    pub fn http(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            provider: provider.into(),
            code: ErrorCode::Http(status),
            retryable: status == 429 || (500..=599).contains(&status),
        }
    }

    /// Provider explicitly reported the job as failed
    pub fn provider_failure(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            provider: provider.into(),
            code: ErrorCode::ProviderFailure,
            retryable: false,
        }
    }

    /// Provider reported the job as canceled
    pub fn canceled(provider: impl Into<String>) -> Self {
        Self {
            message: "generation canceled by provider".to_string(),
            provider: provider.into(),
            code: ErrorCode::ProviderCanceled,
            retryable: false,
        }
    }

    /// Poll budget exhausted without reaching a terminal state
    pub fn poll_timeout(provider: impl Into<String>, attempts: u32) -> Self {
        Self {
            message: format!("job did not complete within {} poll attempts", attempts),
            provider: provider.into(),
            code: ErrorCode::PollTimeout,
            retryable: true,
        }
    }

    /// A single HTTP call exceeded its wall-clock timeout
    pub fn request_timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            provider: provider.into(),
            code: ErrorCode::RequestTimeout,
            retryable: true,
        }
    }

    /// Terminal wrapper produced when all retries are spent
    pub fn exhausted(attempts: u32, last: &ClassifiedError) -> Self {
        Self {
            message: format!(
                "generation failed after {} attempts: {}",
                attempts, last.message
            ),
            provider: last.provider.clone(),
            code: ErrorCode::Exhausted,
            retryable: false,
        }
    }
}

/// Result type alias for SlideForge operations
pub type Result<T> = std::result::Result<T, ClassifiedError>;
