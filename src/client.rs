//! HTTP client for the soil fertility prediction service
//!
//! One POST per submission, bounded by a deadline covering connect, send and
//! body read. On expiry the request future is dropped, which abandons the
//! connection. No retries.

use crate::config::{parse_endpoint, ClientConfig};
use crate::outcome::{classify_response, PredictionOutcome, TransportFailureKind};
use crate::reading::{RawReading, ValidatedReading};
use crate::validation::{validate, ValidationError};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Errors constructing a client or probing service health
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint could not be parsed or is not http(s)
    #[error("Invalid endpoint URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Deadline expired
    #[error("No response within {0} ms")]
    Timeout(u64),
}

/// Response of the service's reachability check
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Reusable client. Holds only the connection pool and immutable settings,
/// so concurrent submissions are independent.
#[derive(Debug, Clone)]
pub struct SoilClient {
    http: Client,
    endpoint: Url,
    health_url: Url,
    timeout: Duration,
}

impl SoilClient {
    /// Create a client for `endpoint` with a total request deadline of `timeout_ms`
    pub fn new(endpoint: &str, timeout_ms: u64) -> Result<Self, ClientError> {
        let url = parse_endpoint(endpoint).map_err(|e| ClientError::InvalidUrl {
            url: endpoint.to_string(),
            message: format!("{:#}", e),
        })?;
        Self::with_url(url, timeout_ms)
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_url(config.endpoint.clone(), config.timeout_ms)
    }

    /// Create a client for an already-parsed endpoint
    pub fn with_url(endpoint: Url, timeout_ms: u64) -> Result<Self, ClientError> {
        let health_url = endpoint
            .join("/api/health")
            .map_err(|e| ClientError::InvalidUrl {
                url: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let timeout = Duration::from_millis(timeout_ms);
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint,
            health_url,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validate, then submit. Validation failures never reach the network.
    pub async fn submit(&self, raw: &RawReading) -> Result<PredictionOutcome, ValidationError> {
        let reading = validate(raw)?;
        Ok(self.submit_validated(&reading).await)
    }

    /// Submit an already-validated reading. Always yields exactly one outcome.
    pub async fn submit_validated(&self, reading: &ValidatedReading) -> PredictionOutcome {
        let start = Instant::now();
        tracing::debug!("POST {} payload={}", self.endpoint, reading.to_payload());

        let outcome = match tokio::time::timeout(self.timeout, self.post(reading)).await {
            Ok(outcome) => outcome,
            Err(_) => PredictionOutcome::TransportFailure {
                kind: TransportFailureKind::Timeout,
                message: format!("No response within {} ms", self.timeout.as_millis()),
            },
        };

        let elapsed = start.elapsed();
        match &outcome {
            PredictionOutcome::Success(result) => tracing::info!(
                "Prediction '{}' (confidence {}) received in {:?}",
                result.fertility_class,
                result.confidence_score,
                elapsed
            ),
            PredictionOutcome::DomainFailure { reason } => {
                tracing::warn!("Prediction declined after {:?}: {}", elapsed, reason)
            }
            PredictionOutcome::TransportFailure { kind, message } => {
                tracing::warn!("Prediction request failed after {:?} ({}): {}", elapsed, kind, message)
            }
        }

        outcome
    }

    async fn post(&self, reading: &ValidatedReading) -> PredictionOutcome {
        let response = match self
            .http
            .post(self.endpoint.clone())
            .json(reading)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return transport_failure(&e),
        };

        let status = response.status();
        if !status.is_success() {
            return PredictionOutcome::TransportFailure {
                kind: TransportFailureKind::Other,
                message: format!("Server responded with HTTP {}", status),
            };
        }

        match response.bytes().await {
            Ok(body) => classify_response(&body),
            Err(e) => transport_failure(&e),
        }
    }

    /// GET /api/health on the endpoint's host
    pub async fn health_check(&self) -> Result<HealthStatus, ClientError> {
        let request = async {
            let response = self
                .http
                .get(self.health_url.clone())
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, reqwest::Error>(response.json::<HealthStatus>().await?)
        };

        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ClientError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

fn transport_failure(e: &reqwest::Error) -> PredictionOutcome {
    let kind = if e.is_timeout() {
        TransportFailureKind::Timeout
    } else if e.is_connect() {
        TransportFailureKind::ConnectionError
    } else {
        TransportFailureKind::Other
    };
    PredictionOutcome::TransportFailure {
        kind,
        message: e.to_string(),
    }
}

/// One-shot submission: validate `raw`, POST it to `endpoint`, classify.
///
/// Returns `Err` only for validation failures. An unusable endpoint URL is
/// reported as `TransportFailure { kind: Other }`.
pub async fn submit(
    raw: &RawReading,
    endpoint: &str,
    timeout_ms: u64,
) -> Result<PredictionOutcome, ValidationError> {
    let reading = validate(raw)?;

    let client = match SoilClient::new(endpoint, timeout_ms) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Cannot build client for {}: {}", endpoint, e);
            return Ok(PredictionOutcome::TransportFailure {
                kind: TransportFailureKind::Other,
                message: e.to_string(),
            });
        }
    };

    Ok(client.submit_validated(&reading).await)
}
