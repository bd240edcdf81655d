//! Client configuration
//!
//! Endpoint and deadline for the prediction service, with defaults that match
//! a locally running service. Overridable via environment:
//! - `SOIL_API_URL`: full URL of the predict endpoint
//! - `SOIL_API_TIMEOUT_MS`: request deadline in milliseconds

use anyhow::{bail, Context, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/predict";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const ENV_ENDPOINT: &str = "SOIL_API_URL";
pub const ENV_TIMEOUT_MS: &str = "SOIL_API_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Predict endpoint, e.g. http://host:5000/api/predict
    pub endpoint: Url,
    /// Upper bound on total request duration
    pub timeout_ms: u64,
}

impl ClientConfig {
    pub fn new(endpoint: &str, timeout_ms: u64) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        if timeout_ms == 0 {
            bail!("Timeout must be greater than zero");
        }
        Ok(Self {
            endpoint,
            timeout_ms,
        })
    }

    /// Load from the process environment, falling back to defaults for unset vars
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup (lets tests avoid touching the real env)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(ENV_ENDPOINT)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let timeout_ms = match lookup(ENV_TIMEOUT_MS) {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid {}: '{}'", ENV_TIMEOUT_MS, raw))?,
            _ => DEFAULT_TIMEOUT_MS,
        };

        Self::new(&endpoint, timeout_ms).with_context(|| "Invalid soil client configuration")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Parse a predict endpoint: an absolute http(s) URL with a host
pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid endpoint URL '{}'", raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Endpoint must be an http(s) URL: '{}'", raw);
    }
    if url.host_str().map_or(true, str::is_empty) {
        bail!("Endpoint URL has no host: '{}'", raw);
    }
    Ok(url)
}
