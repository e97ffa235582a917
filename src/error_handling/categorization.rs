//! Error categorization and retry strategy.

use std::time::Duration;

use anyhow::Error;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::ErrorType;

/// Returns the retry strategy for store-page fetches.
///
/// Exponential backoff starting at `RETRY_INITIAL_DELAY_MS`, doubling per
/// attempt, capped at `RETRY_MAX_DELAY_SECS`, limited to `RETRY_MAX_ATTEMPTS`
/// total attempts.
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Categorizes a `reqwest::Error` into an `ErrorType` counter bucket.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorType {
    if let Some(status) = error.status() {
        if status.as_u16() == crate::config::HTTP_STATUS_TOO_MANY_REQUESTS {
            return ErrorType::TooManyRequests;
        }
    }
    if error.is_timeout() {
        ErrorType::StoreFetchTimeout
    } else {
        ErrorType::StoreFetchError
    }
}

/// Determines if an error is retriable (should be retried).
///
/// Transient conditions that might succeed on retry:
/// - Network timeouts and connection failures
/// - Server errors (5xx)
/// - Rate limiting (429)
///
/// Permanent conditions that should not be retried:
/// - Client errors (4xx except 429)
/// - URL parsing errors
/// - Redirect and decode errors
///
/// Uses error-chain downcasting rather than string matching where possible.
pub(crate) fn is_retriable_error(error: &Error) -> bool {
    // Typed causes decide first, wherever they sit in the chain; context
    // wrappers above them must not shadow the verdict
    for cause in error.chain() {
        if let Some(reqwest_err) = cause.downcast_ref::<reqwest::Error>() {
            if let Some(status) = reqwest_err.status() {
                let status_code = status.as_u16();

                if status_code == crate::config::HTTP_STATUS_TOO_MANY_REQUESTS {
                    return true;
                }
                if (400..500).contains(&status_code) {
                    return false;
                }
                if (500..600).contains(&status_code) {
                    return true;
                }
            }

            if reqwest_err.is_timeout() || reqwest_err.is_connect() || reqwest_err.is_request() {
                return true;
            }

            if reqwest_err.is_redirect() || reqwest_err.is_decode() {
                return false;
            }
        }

        if cause.downcast_ref::<url::ParseError>().is_some() {
            return false;
        }
    }

    // Fallback message checks for errors from layers that don't expose a
    // status code directly
    for cause in error.chain() {
        let msg = cause.to_string().to_lowercase();
        if msg.contains("dns") || msg.contains("resolve") || msg.contains("lookup failed") {
            return true;
        }
        if msg.contains("404") || msg.contains("not found") {
            return false;
        }
        if msg.contains("403") || msg.contains("forbidden") {
            return false;
        }
        if msg.contains("401") || msg.contains("unauthorized") {
            return false;
        }
    }

    // Default: retry unknown errors (might be a transient network issue)
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_retry_strategy_attempt_count() {
        let delays: Vec<_> = get_retry_strategy().collect();
        assert_eq!(delays.len(), crate::config::RETRY_MAX_ATTEMPTS);
    }

    #[test]
    fn test_get_retry_strategy_initial_delay() {
        let first_delay = get_retry_strategy().next().unwrap();
        assert!(first_delay.as_millis() >= crate::config::RETRY_INITIAL_DELAY_MS as u128);
    }

    #[test]
    fn test_get_retry_strategy_capped() {
        let max = Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS);
        for delay in get_retry_strategy() {
            assert!(delay <= max);
        }
    }

    #[test]
    fn test_is_retriable_error_url_parse() {
        let parse_err = url::ParseError::EmptyHost;
        let err: anyhow::Error = parse_err.into();
        assert!(!is_retriable_error(&err));
    }

    #[test]
    fn test_is_retriable_error_404() {
        let err = anyhow::anyhow!("404 not found");
        assert!(!is_retriable_error(&err));
    }

    #[test]
    fn test_is_retriable_error_403() {
        let err = anyhow::anyhow!("403 forbidden");
        assert!(!is_retriable_error(&err));
    }

    #[test]
    fn test_is_retriable_error_dns() {
        let err = anyhow::anyhow!("DNS lookup failed");
        assert!(is_retriable_error(&err));
    }

    #[test]
    fn test_is_retriable_error_unknown_defaults_to_retry() {
        let err = anyhow::anyhow!("Some unknown error");
        assert!(is_retriable_error(&err));
    }

    #[test]
    fn test_is_retriable_error_500() {
        let err = anyhow::anyhow!("HTTP 500 internal server error occurred");
        assert!(is_retriable_error(&err));
    }

    #[test]
    fn test_is_retriable_error_chain_order() {
        let parse_err = url::ParseError::EmptyHost;
        let err: anyhow::Error = parse_err.into();
        let wrapped = err.context("Some other context");
        assert!(!is_retriable_error(&wrapped));
    }
}
