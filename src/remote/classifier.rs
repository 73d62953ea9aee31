//! Zero-shot text classification over HTTP.

use std::time::Duration;

use serde::Serialize;

use super::error::{RemoteError, retry_with_backoff};

const DEFAULT_API_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli";

/// Request body for a zero-shot classification call.
///
/// Serializes to the inference API wire form:
/// `{"inputs": ..., "parameters": {"candidate_labels": [...], "multi_label": false}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationRequest {
    inputs: String,
    parameters: Parameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Parameters {
    candidate_labels: Vec<String>,
    multi_label: bool,
}

impl ClassificationRequest {
    /// Creates a single-label request for `text` over `candidate_labels`.
    pub fn new(text: impl Into<String>, candidate_labels: Vec<String>) -> Self {
        Self {
            inputs: text.into(),
            parameters: Parameters {
                candidate_labels,
                multi_label: false,
            },
        }
    }

    /// Returns the text being classified.
    pub fn text(&self) -> &str {
        &self.inputs
    }

    pub fn candidate_labels(&self) -> &[String] {
        &self.parameters.candidate_labels
    }
}

/// Sends classification requests and returns the raw response body.
///
/// The body is left unparsed; its shape varies between deployments.
pub trait ClassifierClientTrait: Send + Sync {
    fn classify(&self, request: &ClassificationRequest) -> Result<String, RemoteError>;
}

/// Builder for [`ClassifierClient`].
#[derive(Debug, Default)]
pub struct ClassifierClientBuilder {
    api_url: Option<String>,
    api_token: Option<String>,
    timeout: Option<Duration>,
    retries: usize,
}

impl ClassifierClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the full model endpoint URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Sets the bearer token sent with each request.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Overrides the 60 second request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how many times transient failures are retried (default 0).
    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Builds the client.
    ///
    /// # Environment Variables
    ///
    /// Unset builder values fall back to `HF_API_URL` (default: the hosted
    /// `facebook/bart-large-mnli` endpoint) and `HF_API_TOKEN` (default:
    /// no token, so no `Authorization` header is sent).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidUrl`] for an unparseable endpoint URL.
    pub fn build(self) -> Result<ClassifierClient, RemoteError> {
        let api_url = match self.api_url {
            Some(url) => url,
            None => std::env::var("HF_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        };

        let api_token = match self.api_token {
            Some(token) => token,
            None => std::env::var("HF_API_TOKEN").unwrap_or_default(),
        };

        reqwest::Url::parse(&api_url)
            .map_err(|e| RemoteError::InvalidUrl(format!("{}: {}", api_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(60)))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(RemoteError::Network)?;

        Ok(ClassifierClient {
            client,
            api_url,
            api_token,
            retries: self.retries,
        })
    }
}

/// Blocking client for a hosted zero-shot classification model.
pub struct ClassifierClient {
    client: reqwest::blocking::Client,
    api_url: String,
    api_token: String,
    retries: usize,
}

impl ClassifierClient {
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns `true` if requests carry a bearer token.
    pub fn has_token(&self) -> bool {
        !self.api_token.is_empty()
    }
}

impl ClassifierClientTrait for ClassifierClient {
    fn classify(&self, request: &ClassificationRequest) -> Result<String, RemoteError> {
        retry_with_backoff(self.retries, || {
            let mut builder = self.client.post(&self.api_url).json(request);
            if self.has_token() {
                builder = builder.bearer_auth(&self.api_token);
            }

            let response = builder.send()?;

            let status = response.status();
            if status.is_client_error() {
                let body = response.text().unwrap_or_default();
                return Err(match api_error_message(&body) {
                    Some(message) => RemoteError::Api { message },
                    None => RemoteError::Http {
                        status: status.as_u16(),
                    },
                });
            }
            if !status.is_success() {
                return Err(RemoteError::Http {
                    status: status.as_u16(),
                });
            }

            Ok(response.text()?)
        })
    }
}

/// Extracts the message from an `{"error": "..."}` rejection body.
///
/// Only 4xx replies are inspected; 5xx replies (a model still loading, for
/// instance) stay [`RemoteError::Http`] so they remain retryable.
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value.get("error")?.as_str()?.trim();
    (!message.is_empty()).then(|| message.to_string())
}
