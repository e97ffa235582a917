//! Configuration constants.
//!
//! This module defines all operational constants used throughout the crate,
//! including timeouts, worker-pool limits, and heuristic thresholds.
//!
//! The classifier thresholds are deliberately exposed here as tunables rather
//! than buried in the scoring code: the heuristics drifted across revisions of
//! the system this replaces, and the exact values are configuration, not
//! contract.

use std::time::Duration;

// Network operation timeouts
/// Per-request timeout for store-page fetches in seconds
pub const STORE_FETCH_TIMEOUT_SECS: u64 = 15;
/// Per-request timeout for checkout/auth subpage probes in seconds
pub const SUBPAGE_FETCH_TIMEOUT_SECS: u64 = 10;
/// Per-request timeout for protection probes in seconds
/// Kept short: a probe only needs enough of the body to spot a challenge page
pub const PROBE_TIMEOUT_SECS: u64 = 8;
/// Per-engine overall search task timeout in seconds
/// Covers all requested result pages for one engine, including jitter delays
pub const ENGINE_TASK_TIMEOUT_SECS: u64 = 45;
/// Per-URL analysis timeout
/// Formula: store fetch (15s) + up to 4 subpage probes (10s each, sequential
/// worst case) + parsing buffer
pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(60);

// Worker-pool limits (one independent cap per fan-out stage)
/// Concurrent protection probes
pub const DEFAULT_PROBE_CONCURRENCY: usize = 10;
/// Concurrent store analyses
pub const DEFAULT_ANALYSIS_CONCURRENCY: usize = 15;

// Inter-page jitter for search-engine pagination
/// Minimum delay between result-page fetches in milliseconds
pub const PAGE_JITTER_MIN_MS: u64 = 300;
/// Maximum delay between result-page fetches in milliseconds
pub const PAGE_JITTER_MAX_MS: u64 = 1500;

// Discovery budgets
/// Candidate-pool oversampling factor relative to max_results.
/// Protection filtering and failed analyses cause heavy attrition, so the
/// orchestrator gathers roughly this many times the requested result count
/// before it stops issuing further query templates.
pub const OVERSAMPLE_FACTOR: usize = 3;
/// Default number of result pages requested per engine
pub const DEFAULT_SEARCH_PAGES: usize = 2;
/// Default result budget for a discovery call
pub const DEFAULT_MAX_RESULTS: usize = 20;

// Store-classifier thresholds (tunable, see module doc)
/// Minimum count of textual store-indicator phrases for a positive verdict
pub const INDICATOR_HITS_THRESHOLD: usize = 3;
/// Action elements (buy/cart buttons and inputs) must exceed this count
pub const ACTION_ELEMENTS_THRESHOLD: usize = 2;
/// Product/price block elements must exceed this count
pub const PRODUCT_ELEMENTS_THRESHOLD: usize = 3;

// Response size limits
/// Maximum response body size in bytes (2MB)
/// Responses larger than this are truncated before scanning
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;

// Record cache
/// Default bounded-LRU capacity for the URL -> StoreRecord cache.
/// The system this replaces kept an unbounded map; a bound is required to
/// keep long-running discovery processes from growing without limit.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

// Retry strategy for store-page fetches
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 10;
/// Maximum number of attempts (initial attempt + retries)
pub const RETRY_MAX_ATTEMPTS: usize = 3;

/// Absolute tolerance when matching a caller-supplied target price against
/// extracted prices
pub const TARGET_PRICE_TOLERANCE: f64 = 0.1;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
