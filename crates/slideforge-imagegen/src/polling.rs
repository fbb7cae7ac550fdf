//! Bounded polling loop for submit-then-poll providers
//!
//! One engine instance is owned per adapter invocation. The loop runs
//! `submitted -> polling -> {succeeded | failed | canceled}` and gives up
//! with a timeout exactly when the attempt budget is spent. Transport
//! hiccups during polling consume attempts at this layer; they are
//! independent of the outer whole-generation retries.

use crate::config::{ProviderId, ProviderParams};
use serde_json::Value;
use slideforge_core::{ClassifiedError, Result};
use std::time::Duration;

/// Lifecycle of one in-flight provider job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    Submitted,
    Polling,
    Succeeded,
    Failed,
    Canceled,
    TimedOut,
}

/// One in-flight request against an asynchronous provider. Ephemeral and
/// adapter-internal; never persisted.
#[derive(Debug, Clone)]
pub struct GenerationAttempt {
    /// Provider-issued job identifier
    pub job_id: String,
    pub status: AttemptStatus,
}

impl GenerationAttempt {
    pub fn submitted(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: AttemptStatus::Submitted,
        }
    }
}

/// What one status check observed
#[derive(Debug, Clone)]
pub enum PollStatus {
    /// Not terminal yet
    Processing,
    /// Terminal success; carries the completion payload
    Succeeded(Value),
    /// Terminal failure reported by the provider
    Failed(String),
    /// Terminal cancellation reported by the provider
    Canceled,
}

/// Bounded poll loop
pub struct PollingEngine<'a> {
    provider: ProviderId,
    params: &'a ProviderParams,
    sleep: &'a dyn Fn(Duration),
}

impl<'a> PollingEngine<'a> {
    pub fn new(
        provider: ProviderId,
        params: &'a ProviderParams,
        sleep: &'a dyn Fn(Duration),
    ) -> Self {
        Self {
            provider,
            params,
            sleep,
        }
    }

    /// Drive the attempt to a terminal state. Each iteration sleeps the
    /// poll interval and performs exactly one status request via `check`.
    ///
    /// Retryable errors from `check` (transient transport trouble) consume
    /// an attempt and the loop continues; non-retryable errors propagate
    /// immediately. Exhausting the budget yields a retryable poll timeout.
    pub fn run<F>(&self, attempt: &mut GenerationAttempt, mut check: F) -> Result<Value>
    where
        F: FnMut() -> Result<PollStatus>,
    {
        let interval = Duration::from_millis(self.params.poll_interval_ms);
        attempt.status = AttemptStatus::Polling;

        for iteration in 1..=self.params.max_poll_attempts {
            (self.sleep)(interval);

            match check() {
                Ok(PollStatus::Processing) => {
                    tracing::debug!(
                        provider = self.provider.as_str(),
                        job_id = %attempt.job_id,
                        iteration,
                        "job still processing"
                    );
                }
                Ok(PollStatus::Succeeded(payload)) => {
                    attempt.status = AttemptStatus::Succeeded;
                    return Ok(payload);
                }
                Ok(PollStatus::Failed(message)) => {
                    attempt.status = AttemptStatus::Failed;
                    return Err(ClassifiedError::provider_failure(
                        self.provider.as_str(),
                        message,
                    ));
                }
                Ok(PollStatus::Canceled) => {
                    attempt.status = AttemptStatus::Canceled;
                    return Err(ClassifiedError::canceled(self.provider.as_str()));
                }
                Err(e) if e.retryable && iteration < self.params.max_poll_attempts => {
                    tracing::warn!(
                        provider = self.provider.as_str(),
                        job_id = %attempt.job_id,
                        iteration,
                        error = %e,
                        "transient poll failure"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        attempt.status = AttemptStatus::TimedOut;
        Err(ClassifiedError::poll_timeout(
            self.provider.as_str(),
            self.params.max_poll_attempts,
        ))
    }
}
