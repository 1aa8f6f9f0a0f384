//! Rate-limit aware retry loop
//!
//! The catalog signals throttling with HTTP 429 and tells us how long to wait in
//! the `x-ratelimit-reset-after` header. Only that condition is retried; every
//! other failure is returned to the caller unchanged.
//!
//! # Example
//!
//! ```no_run
//! use jimaku_dl::config::RateLimitConfig;
//! use jimaku_dl::ratelimit::{Attempt, with_backoff};
//!
//! # async fn example() -> jimaku_dl::Result<()> {
//! let config = RateLimitConfig::default();
//! let body = with_backoff(&config, || async {
//!     // Issue the request here and map 429 to Attempt::RateLimited
//!     Ok(Attempt::Done("body".to_string()))
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RateLimitConfig;
use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Response header carrying the server-suggested wait in seconds
pub const RESET_AFTER_HEADER: &str = "x-ratelimit-reset-after";

/// Outcome of a single attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    /// The attempt finished, stop retrying
    Done(T),
    /// The server throttled us, wait this long before the next attempt
    RateLimited(Duration),
}

/// Compute the wait for a throttled response
///
/// Missing or unparsable header values fall back to `default_reset_after`.
/// The result never exceeds `max_delay`.
pub fn reset_delay(header: Option<&str>, config: &RateLimitConfig) -> Duration {
    let advertised = header
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite())
        .map(|secs| Duration::from_secs_f64(secs.clamp(0.0, config.max_delay.as_secs_f64())))
        .unwrap_or(config.default_reset_after);

    advertised.min(config.max_delay)
}

/// Run `operation` until it completes or the backoff limit is reached
///
/// Errors returned by `operation` propagate immediately without retry.
/// After the last throttled attempt no wait is performed; the call fails with
/// [`Error::Throttled`].
pub async fn with_backoff<F, Fut, T>(config: &RateLimitConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Attempt<T>>>,
{
    let limit = config.backoff_limit;

    for attempt in 1..=limit {
        match operation().await? {
            Attempt::Done(value) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "request succeeded after rate limit");
                }
                return Ok(value);
            }
            Attempt::RateLimited(delay) => {
                tracing::warn!(
                    attempt,
                    backoff_limit = limit,
                    delay_ms = delay.as_millis() as u64,
                    "catalog rate limit hit"
                );
                if attempt < limit {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    tracing::error!(backoff_limit = limit, "rate limit backoff exhausted");
    Err(Error::Throttled { attempts: limit })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(backoff_limit: u32) -> RateLimitConfig {
        RateLimitConfig {
            backoff_limit,
            max_delay: Duration::from_millis(20),
            default_reset_after: Duration::from_millis(10),
        }
    }

    #[test]
    fn reset_delay_clamps_to_max() {
        let config = RateLimitConfig::default();
        assert_eq!(reset_delay(Some("10"), &config), Duration::from_secs(5));
        assert_eq!(reset_delay(Some("2.5"), &config), Duration::from_millis(2500));
    }

    #[test]
    fn reset_delay_defaults_when_header_missing_or_garbage() {
        let config = RateLimitConfig {
            backoff_limit: 3,
            max_delay: Duration::from_secs(5),
            default_reset_after: Duration::from_secs(3),
        };
        assert_eq!(reset_delay(None, &config), Duration::from_secs(3));
        assert_eq!(reset_delay(Some("soon"), &config), Duration::from_secs(3));
        assert_eq!(reset_delay(Some("NaN"), &config), Duration::from_secs(3));
    }

    #[test]
    fn reset_delay_negative_is_zero() {
        let config = RateLimitConfig::default();
        assert_eq!(reset_delay(Some("-1"), &config), Duration::ZERO);
    }

    #[tokio::test]
    async fn done_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let value = with_backoff(&fast_config(3), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Attempt::Done(42))
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rate_limited_then_done() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let value = with_backoff(&fast_config(3), || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(Attempt::RateLimited(Duration::from_millis(5)))
                } else {
                    Ok(Attempt::Done("ok"))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausted_backoff_is_throttled() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = with_backoff(&fast_config(3), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Attempt::<()>::RateLimited(Duration::from_millis(5)))
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Throttled { attempts: 3 }));
        assert_eq!(calls.load(Ordering::SeqCst), 3, "should stop at the limit");
    }

    #[tokio::test]
    async fn errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = with_backoff(&fast_config(3), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<Attempt<()>, _>(Error::Authentication("bad key".into()))
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Authentication(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn waits_between_throttled_attempts() {
        let config = RateLimitConfig {
            backoff_limit: 3,
            max_delay: Duration::from_millis(50),
            default_reset_after: Duration::from_millis(50),
        };
        let start = std::time::Instant::now();

        let _ = with_backoff(&config, || async {
            Ok(Attempt::<()>::RateLimited(Duration::from_millis(30)))
        })
        .await;

        // two waits, none after the final attempt
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(60), "waited {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "waited {elapsed:?}");
    }
}
