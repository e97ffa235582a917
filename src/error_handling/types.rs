//! Error type definitions.
//!
//! This module defines all error and info types used throughout the crate.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Caller-contract violations.
///
/// This is the one error category that is surfaced to the caller instead of
/// being absorbed into an empty result: it indicates bad input, not an
/// environmental failure.
#[derive(Error, Debug)]
pub enum InputError {
    /// The URL is missing, unparseable, or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A numeric filter parameter is out of range or not a number.
    #[error("Invalid numeric parameter {name}: {value}")]
    InvalidNumber {
        /// Parameter name as supplied by the caller
        name: &'static str,
        /// The rejected value
        value: String,
    },
}

/// Types of errors that can occur during discovery and analysis.
///
/// These categorize failures that prevented a unit of work (a search page, a
/// probe, an analysis) from producing data. They are counted, not propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Search-engine fan-out
    EngineFetchError,
    EngineParseError,
    EngineTaskTimeout,
    // Protection probing
    ProbeFetchError,
    ProbeTimeout,
    // Store analysis
    StoreFetchError,
    StoreFetchTimeout,
    CheckoutProbeError,
    AnalysisTimeout,
    // Rate limiting observed anywhere
    TooManyRequests,
    // Notification sink
    NotifyError,
}

/// Informational metrics that aren't failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// A candidate URL matched the excluded-domain list and was dropped
    /// without a network call
    ExcludedDomainSkipped,
    /// A probe classified a candidate as protected
    ProtectedUrlSkipped,
    /// A fetched page failed store classification
    NotAStore,
    /// An analysis result was served from the record cache
    CacheHit,
    /// A completed result arrived after the budget closed and was discarded
    BudgetOverflowDiscarded,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::EngineFetchError => "Search engine fetch error",
            ErrorType::EngineParseError => "Search engine parse error",
            ErrorType::EngineTaskTimeout => "Search engine task timeout",
            ErrorType::ProbeFetchError => "Protection probe error",
            ErrorType::ProbeTimeout => "Protection probe timeout",
            ErrorType::StoreFetchError => "Store page fetch error",
            ErrorType::StoreFetchTimeout => "Store page fetch timeout",
            ErrorType::CheckoutProbeError => "Checkout subpage probe error",
            ErrorType::AnalysisTimeout => "Analysis timeout",
            ErrorType::TooManyRequests => "Too many requests (429)",
            ErrorType::NotifyError => "Notification delivery error",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::ExcludedDomainSkipped => "Excluded domain skipped",
            InfoType::ProtectedUrlSkipped => "Protected URL skipped",
            InfoType::NotAStore => "Not a store",
            InfoType::CacheHit => "Cache hit",
            InfoType::BudgetOverflowDiscarded => "Result past budget discarded",
        }
    }
}
