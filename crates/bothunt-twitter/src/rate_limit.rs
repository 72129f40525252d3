//! Retry with exponential back-off for the Twitter client.
//!
//! Rate limits (429), timeouts, refused connections and 5xx responses are
//! retried.
//! Not-found, suspended, unauthorized and malformed responses are returned
//! immediately: asking again gives the same answer.

use std::future::Future;
use std::time::Duration;

use crate::error::TwitterError;

/// A rate-limit window is 15 minutes; never sleep longer than one window.
const MAX_DELAY_SECS: u64 = 900;

pub(crate) fn is_retriable(err: &TwitterError) -> bool {
    match err {
        TwitterError::RateLimited { .. } => true,
        TwitterError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        TwitterError::UnexpectedStatus { status, .. } => *status >= 500,
        TwitterError::Deserialize { .. }
        | TwitterError::NotFound { .. }
        | TwitterError::Suspended { .. }
        | TwitterError::Unauthorized { .. }
        | TwitterError::InvalidBaseUrl { .. }
        | TwitterError::InvalidCredentials(_) => false,
    }
}

/// Delay before retry number `attempt + 1`.
///
/// `backoff_base_secs * 2^attempt` with ±25 % jitter, raised to the server's
/// requested wait for rate limits, capped at [`MAX_DELAY_SECS`].
fn delay_for(err: &TwitterError, attempt: u32, backoff_base_secs: u64) -> Duration {
    let computed = backoff_base_secs.saturating_mul(1u64 << attempt.min(10));
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered_ms = (computed as f64 * 1000.0 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    let floor_ms = match err {
        TwitterError::RateLimited { retry_after_secs } => retry_after_secs.saturating_mul(1000),
        _ => 0,
    };
    Duration::from_millis(jittered_ms.max(floor_ms).min(MAX_DELAY_SECS * 1000))
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, TwitterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TwitterError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                let delay = delay_for(&err, attempt, backoff_base_secs);
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient Twitter API error, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn rate_limited(retry_after_secs: u64) -> TwitterError {
        TwitterError::RateLimited { retry_after_secs }
    }

    #[test]
    fn server_errors_are_retriable_client_errors_are_not() {
        assert!(is_retriable(&TwitterError::UnexpectedStatus {
            status: 503,
            url: "u".to_owned()
        }));
        assert!(!is_retriable(&TwitterError::UnexpectedStatus {
            status: 400,
            url: "u".to_owned()
        }));
        assert!(!is_retriable(&TwitterError::Suspended { url: "u".to_owned() }));
        assert!(!is_retriable(&TwitterError::NotFound { url: "u".to_owned() }));
        assert!(is_retriable(&rate_limited(0)));
    }

    #[test]
    fn request_build_errors_are_not_retriable() {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        assert!(err.is_builder());
        assert!(!is_retriable(&TwitterError::Http(err)));
    }

    #[tokio::test]
    async fn connection_refused_is_retriable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = reqwest::get(format!("http://{addr}/")).await.unwrap_err();
        assert!(err.is_connect(), "{err:?}");
        assert!(is_retriable(&TwitterError::Http(err)));
    }

    #[test]
    fn rate_limit_delay_honours_retry_after_up_to_cap() {
        assert_eq!(delay_for(&rate_limited(30), 0, 0), Duration::from_secs(30));
        assert_eq!(
            delay_for(&rate_limited(10_000), 0, 0),
            Duration::from_secs(MAX_DELAY_SECS)
        );
    }

    #[test]
    fn backoff_delay_grows_within_jitter_band() {
        let err = TwitterError::UnexpectedStatus {
            status: 502,
            url: "u".to_owned(),
        };
        let d = delay_for(&err, 2, 1);
        assert!(d >= Duration::from_millis(3000) && d <= Duration::from_millis(5000), "{d:?}");
    }

    #[tokio::test]
    async fn retries_on_rate_limited_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(rate_limited(0))
                } else {
                    Ok::<u32, TwitterError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, TwitterError>(rate_limited(0))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(TwitterError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_suspended_account() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, TwitterError>(TwitterError::Suspended {
                    url: "https://api.twitter.com/1.1/users/show.json".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(TwitterError::Suspended { .. })));
    }
}
