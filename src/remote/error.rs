use std::thread;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to a remote service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The catalog or classifier host could not be reached.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// A lookup or classification exceeded its client timeout.
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Non-success reply that carried no usable error message.
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// A catalog reply was not valid JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The classifier rejected the request (4xx) with an `{"error": ...}` body.
    #[error("API error: {message}")]
    Api { message: String },

    /// A configured service URL (flag or environment) failed to parse.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }
}

/// Backoff delays in seconds; also caps the number of retries.
const DELAYS: [u64; 3] = [1, 2, 4];

/// Runs `f`, retrying transient failures up to `retries` times.
///
/// Retries wait 1s, 2s and 4s in turn; at most three retries are made no
/// matter how many are requested. Only network errors, timeouts and HTTP
/// 5xx responses are retried.
///
/// # Errors
///
/// Returns the first non-transient error, or the last error once retries
/// are exhausted.
pub fn retry_with_backoff<F, T>(retries: usize, mut f: F) -> Result<T, RemoteError>
where
    F: FnMut() -> Result<T, RemoteError>,
{
    let mut last_error = match f() {
        Ok(result) => return Ok(result),
        Err(e) if !should_retry(&e) => return Err(e),
        Err(e) => e,
    };

    for (attempt, &delay_secs) in DELAYS.iter().take(retries).enumerate() {
        tracing::debug!(
            attempt = attempt + 1,
            delay_secs,
            error = %last_error,
            "retrying request"
        );
        thread::sleep(Duration::from_secs(delay_secs));

        match f() {
            Ok(result) => return Ok(result),
            Err(e) if !should_retry(&e) => return Err(e),
            Err(e) => last_error = e,
        }
    }

    Err(last_error)
}

/// Returns `true` for transient errors (HTTP 5xx, network errors, timeouts).
fn should_retry(error: &RemoteError) -> bool {
    match error {
        RemoteError::Network(_) | RemoteError::Timeout(_) => true,
        RemoteError::Http { status } => (500..600).contains(status),
        RemoteError::Serialization(_) | RemoteError::Api { .. } | RemoteError::InvalidUrl(_) => {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::error::Error;

    fn network_error() -> RemoteError {
        let reqwest_error = reqwest::blocking::Client::new()
            .get("not-a-valid-url")
            .build()
            .unwrap_err();
        RemoteError::Network(reqwest_error)
    }

    #[test]
    fn http_error_display_includes_status() {
        let error = RemoteError::Http { status: 404 };
        let msg = error.to_string();

        assert!(msg.contains("HTTP error"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn serialization_error_keeps_source() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = RemoteError::Serialization(json_error);

        assert!(error.to_string().contains("Serialization error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn builder_errors_convert_to_network_variant() {
        let reqwest_error = reqwest::blocking::Client::new()
            .get("http://")
            .build()
            .unwrap_err();

        assert!(matches!(RemoteError::from(reqwest_error), RemoteError::Network(_)));
    }

    #[test]
    fn zero_retries_makes_a_single_attempt() {
        let attempts = Cell::new(0);
        let result: Result<(), RemoteError> = retry_with_backoff(0, || {
            attempts.set(attempts.get() + 1);
            Err(network_error())
        });

        assert!(result.is_err());
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn retry_succeeds_after_transient_error() {
        let attempts = Cell::new(0);
        let result = retry_with_backoff(2, || {
            attempts.set(attempts.get() + 1);
            if attempts.get() < 2 {
                Err(RemoteError::Http { status: 503 })
            } else {
                Ok("success")
            }
        });

        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn retry_does_not_occur_on_client_errors() {
        let attempts = Cell::new(0);
        let result: Result<(), RemoteError> = retry_with_backoff(3, || {
            attempts.set(attempts.get() + 1);
            Err(RemoteError::Http { status: 404 })
        });

        assert!(matches!(result, Err(RemoteError::Http { status: 404 })));
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn retry_does_not_occur_on_api_errors() {
        let attempts = Cell::new(0);
        let result: Result<(), RemoteError> = retry_with_backoff(3, || {
            attempts.set(attempts.get() + 1);
            Err(RemoteError::Api {
                message: "bad request".to_string(),
            })
        });

        assert!(result.is_err());
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn should_retry_classifies_errors() {
        assert!(should_retry(&network_error()));
        assert!(should_retry(&RemoteError::Http { status: 500 }));
        assert!(!should_retry(&RemoteError::Http { status: 429 }));
        assert!(!should_retry(&RemoteError::InvalidUrl("x".to_string())));
        assert!(!should_retry(&RemoteError::Api {
            message: "invalid token".to_string()
        }));
    }
}
