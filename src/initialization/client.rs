//! HTTP client initialization.
//!
//! This module provides functions to initialize HTTP clients with proper
//! configuration for store fetching and protection probing.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::Config;

/// Initializes the HTTP client used for store-page and search-engine fetches.
///
/// Creates a `reqwest::Client` configured with:
/// - Timeout from config
/// - Redirect following enabled (up to 10 hops)
/// - Optional TLS-verification bypass (config toggle)
/// - Rustls TLS backend
///
/// No default User-Agent is set on the client; each request carries its own
/// randomized User-Agent from the pool.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.fetch_timeout_seconds))
        .redirect(reqwest::redirect::Policy::limited(10))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the HTTP client used for protection probes.
///
/// Same shape as the fetch client but with the shorter probe timeout: a probe
/// only needs enough of the body to spot a challenge page, and a slow target
/// should not hold a probe slot for long.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_probe_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.probe_timeout_seconds))
        .redirect(reqwest::redirect::Policy::limited(10))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()?;
    Ok(Arc::new(client))
}
