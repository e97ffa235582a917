//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions and categorization
//! - Processing statistics tracking (errors and info metrics)
//! - Retry strategy configuration
//!
//! The internal philosophy is "best-effort, keep going": almost every failure
//! mode is caught at its origin, counted, and converted into an empty or
//! negative result. The only errors that reach a caller are input-contract
//! violations (`InputError`).

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, get_retry_strategy};
pub(crate) use categorization::is_retriable_error;
pub use stats::ProcessingStats;
pub use types::{ErrorType, InfoType, InitializationError, InputError};
