//! Configuration types.
//!
//! This module defines the library `Config` struct and the enums shared
//! between the library and the CLI binary.

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_ANALYSIS_CONCURRENCY, DEFAULT_CACHE_CAPACITY, DEFAULT_PROBE_CONCURRENCY,
    PROBE_TIMEOUT_SECS, STORE_FETCH_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Sort order applied to a discovery result set before returning.
///
/// Without an explicit sort key the result order is unspecified: records are
/// accepted in whatever order the concurrent analyses complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortBy {
    /// Gateway count, descending
    Gateways,
    /// Average extracted price, ascending
    Price,
}

/// Notification sink settings (opaque token plus destination id).
///
/// Delivery is fire-and-forget: a misconfigured or unreachable sink is logged
/// and never affects a discovery call.
#[derive(Clone, Debug)]
pub struct NotifyConfig {
    /// Bot token used to address the sink
    pub token: String,
    /// Destination chat/channel id
    pub chat_id: String,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use storeprobe::Config;
///
/// let config = Config {
///     analysis_concurrency: 20,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Per-request timeout for store-page fetches, in seconds
    pub fetch_timeout_seconds: u64,

    /// Per-request timeout for protection probes, in seconds
    pub probe_timeout_seconds: u64,

    /// Fixed User-Agent override; when `None`, a randomized browser
    /// User-Agent is drawn from the built-in pool per request
    pub user_agent: Option<String>,

    /// Disable TLS certificate verification for outbound requests.
    /// Many of the probed stores carry broken certificate chains; analysis of
    /// such targets is only possible with verification off.
    pub accept_invalid_certs: bool,

    /// Concurrent search-engine tasks (0 = one task per configured engine)
    pub search_concurrency: usize,

    /// Concurrent protection probes
    pub probe_concurrency: usize,

    /// Concurrent store analyses
    pub analysis_concurrency: usize,

    /// Bounded LRU capacity for the URL -> StoreRecord cache
    pub cache_capacity: usize,

    /// Optional notification sink fired after each discovery call
    pub notify: Option<NotifyConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: STORE_FETCH_TIMEOUT_SECS,
            probe_timeout_seconds: PROBE_TIMEOUT_SECS,
            user_agent: None,
            accept_invalid_certs: true,
            search_concurrency: 0,
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
            analysis_concurrency: DEFAULT_ANALYSIS_CONCURRENCY,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            notify: None,
        }
    }
}
