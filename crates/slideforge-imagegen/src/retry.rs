//! Whole-generation retry loop with capped exponential backoff
//!
//! This is the single place that decides whether a failed attempt loops
//! again. The inner polling loop has its own independent budget; by the
//! time an error reaches this layer it represents a whole failed
//! generation attempt. Backoff carries no jitter.

use slideforge_core::{ClassifiedError, Result};
use std::time::Duration;

const BACKOFF_BASE_MS: u64 = 1000;
const BACKOFF_CAP_MS: u64 = 10_000;

/// Delay slept after failed attempt `attempt` (1-based):
/// `min(1000 * 2^(attempt-1), 10000)` ms
pub fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(63);
    let ms = BACKOFF_BASE_MS
        .saturating_mul(1u64 << exp)
        .min(BACKOFF_CAP_MS);
    Duration::from_millis(ms)
}

/// Run `attempt_fn` up to `max_retries` times. Returns on the first
/// success; stops immediately on a non-retryable error; after the final
/// retryable failure wraps the last error as exhausted.
pub fn with_retries<T, F>(provider: &str, max_retries: u32, attempt_fn: F) -> Result<T>
where
    F: FnMut(u32) -> Result<T>,
{
    with_retries_sleep(provider, max_retries, attempt_fn, std::thread::sleep)
}

/// `with_retries` with an injectable sleep, so tests can observe the
/// backoff schedule without waiting it out
pub fn with_retries_sleep<T, F, S>(
    provider: &str,
    max_retries: u32,
    mut attempt_fn: F,
    mut sleep: S,
) -> Result<T>
where
    F: FnMut(u32) -> Result<T>,
    S: FnMut(Duration),
{
    let budget = max_retries.max(1);

    for attempt in 1..=budget {
        match attempt_fn(attempt) {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(provider, attempt, "generation succeeded after retries");
                }
                return Ok(value);
            }
            Err(e) if !e.retryable => {
                tracing::warn!(provider, attempt, error = %e, "non-retryable failure");
                return Err(e);
            }
            Err(e) if attempt == budget => {
                tracing::warn!(provider, attempt, error = %e, "retry budget exhausted");
                return Err(ClassifiedError::exhausted(budget, &e));
            }
            Err(e) => {
                let delay = backoff_delay(attempt);
                tracing::warn!(
                    provider,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retryable failure, backing off"
                );
                sleep(delay);
            }
        }
    }

    unreachable!("retry loop always returns within the budget")
}

#[cfg(test)]
mod tests {
    use super::*;
    use slideforge_core::ErrorCode;

    fn retryable() -> ClassifiedError {
        ClassifiedError::http("fal", 503, "unavailable")
    }

    fn fatal() -> ClassifiedError {
        ClassifiedError::http("fal", 401, "bad key")
    }

    #[test]
    fn test_backoff_schedule() {
        assert_eq!(backoff_delay(1), Duration::from_millis(1000));
        assert_eq!(backoff_delay(2), Duration::from_millis(2000));
        assert_eq!(backoff_delay(3), Duration::from_millis(4000));
        assert_eq!(backoff_delay(4), Duration::from_millis(8000));
        // Capped at 10s from the fifth attempt on
        assert_eq!(backoff_delay(5), Duration::from_millis(10_000));
        assert_eq!(backoff_delay(12), Duration::from_millis(10_000));
    }

    #[test]
    fn test_first_success_returns_immediately() {
        let mut calls = 0;
        let result = with_retries_sleep(
            "fal",
            3,
            |_| {
                calls += 1;
                Ok(42)
            },
            |_| panic!("no sleep on success"),
        );
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retries_until_success() {
        let mut calls = 0;
        let mut slept = Vec::new();
        let result = with_retries_sleep(
            "fal",
            3,
            |_| {
                calls += 1;
                if calls < 3 {
                    Err(retryable())
                } else {
                    Ok("done")
                }
            },
            |d| slept.push(d),
        );
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls, 3);
        assert_eq!(
            slept,
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
    }

    #[test]
    fn test_non_retryable_stops_after_one_attempt() {
        let mut calls = 0;
        let err = with_retries_sleep(
            "fal",
            3,
            |_| -> Result<()> {
                calls += 1;
                Err(fatal())
            },
            |_| panic!("no backoff for fatal errors"),
        )
        .unwrap_err();
        assert_eq!(calls, 1);
        assert_eq!(err.code, ErrorCode::Http(401));
    }

    #[test]
    fn test_exhaustion_wraps_last_error() {
        let mut calls = 0;
        let mut sleeps = 0;
        let err = with_retries_sleep(
            "fal",
            3,
            |_| -> Result<()> {
                calls += 1;
                Err(retryable())
            },
            |_| sleeps += 1,
        )
        .unwrap_err();
        assert_eq!(calls, 3);
        assert_eq!(sleeps, 2);
        assert_eq!(err.code, ErrorCode::Exhausted);
        assert!(err.message.contains("after 3 attempts"));
        assert!(err.message.contains("unavailable"));
    }

    #[test]
    fn test_attempt_numbers_are_one_based() {
        let mut seen = Vec::new();
        let _ = with_retries_sleep(
            "fal",
            3,
            |attempt| -> Result<()> {
                seen.push(attempt);
                Err(retryable())
            },
            |_| {},
        );
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_budget_still_attempts_once() {
        let mut calls = 0;
        let _ = with_retries_sleep(
            "fal",
            0,
            |_| -> Result<()> {
                calls += 1;
                Err(retryable())
            },
            |_| {},
        );
        assert_eq!(calls, 1);
    }
}
