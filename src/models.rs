//! Core data model for store analysis and discovery.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::SortBy;

/// A literal search query plus the number of result pages to request per
/// engine. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// The boolean/keyword query string, operators and quoting included
    pub query: String,
    /// Result pages to fetch per engine
    pub pages: usize,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, pages: usize) -> Self {
        Self {
            query: query.into(),
            pages: pages.max(1),
        }
    }
}

/// Verdict of a single protection probe. Transient; not persisted beyond the
/// filter call that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionVerdict {
    pub url: String,
    pub is_protected: bool,
}

/// The central output entity: one analyzed store.
///
/// A `StoreRecord` is only constructed for a URL that both survived the
/// protection filter and passed store classification; a URL failing either
/// check yields no record at all, never a zeroed one. Immutable after
/// creation.
#[derive(Debug, Clone, Serialize)]
pub struct StoreRecord {
    /// The analyzed URL
    pub url: String,
    /// Store-classification verdict
    pub is_real_store: bool,
    /// Detected payment gateways and payment-capability labels
    pub gateways: BTreeSet<String>,
    /// Derived: number of detected gateways
    pub gateway_count: usize,
    /// CAPTCHA marker present
    pub has_captcha: bool,
    /// Cloudflare marker present (body text or cf-ray header)
    pub has_cloudflare: bool,
    /// 3-D Secure / VBV marker present
    pub has_vbv: bool,
    /// Authentication flow present (login/register paths or markers)
    pub has_auth: bool,
    /// Raw matched price substrings, in match order, duplicates kept
    pub prices_found: Vec<String>,
    /// Mean of parseable prices, 0.0 when none
    pub average_price: f64,
    /// Minimum parseable price, 0.0 when none
    pub min_price: f64,
    /// Maximum parseable price, 0.0 when none
    pub max_price: f64,
}

impl StoreRecord {
    /// Builds a record, deriving `gateway_count` from the gateway set so the
    /// two can never disagree.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url: String,
        is_real_store: bool,
        gateways: BTreeSet<String>,
        has_captcha: bool,
        has_cloudflare: bool,
        has_vbv: bool,
        has_auth: bool,
        prices_found: Vec<String>,
        average_price: f64,
        min_price: f64,
        max_price: f64,
    ) -> Self {
        let gateway_count = gateways.len();
        Self {
            url,
            is_real_store,
            gateways,
            gateway_count,
            has_captcha,
            has_cloudflare,
            has_vbv,
            has_auth,
            prices_found,
            average_price,
            min_price,
            max_price,
        }
    }
}

/// Post-hoc filters applied to analyzed records as they arrive.
///
/// `None` fields are "don't care"; `Some` fields must match exactly.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryFilters {
    /// Minimum number of detected gateways
    pub min_gateways: Option<usize>,
    /// Required Cloudflare flag value
    pub cloudflare: Option<bool>,
    /// Required auth-flow flag value
    pub auth: Option<bool>,
    /// Required CAPTCHA flag value
    pub captcha: Option<bool>,
    /// Required 3-D Secure/VBV flag value
    pub vbv: Option<bool>,
    /// A gateway name (case-insensitive substring) that must be present
    pub gateway_type: Option<String>,
    /// A price that must appear among the parsed prices, within tolerance
    pub target_price: Option<f64>,
}

impl DiscoveryFilters {
    /// Checks a record against every specified filter.
    pub fn accepts(&self, record: &StoreRecord, parsed_prices: &[f64]) -> bool {
        if let Some(min) = self.min_gateways {
            if record.gateway_count < min {
                return false;
            }
        }
        if let Some(want) = self.cloudflare {
            if record.has_cloudflare != want {
                return false;
            }
        }
        if let Some(want) = self.auth {
            if record.has_auth != want {
                return false;
            }
        }
        if let Some(want) = self.captcha {
            if record.has_captcha != want {
                return false;
            }
        }
        if let Some(want) = self.vbv {
            if record.has_vbv != want {
                return false;
            }
        }
        if let Some(ref wanted) = self.gateway_type {
            let wanted_lower = wanted.to_lowercase();
            if !record
                .gateways
                .iter()
                .any(|g| g.to_lowercase().contains(&wanted_lower))
            {
                return false;
            }
        }
        if let Some(target) = self.target_price {
            if !parsed_prices
                .iter()
                .any(|p| (p - target).abs() <= crate::config::TARGET_PRICE_TOLERANCE)
            {
                return false;
            }
        }
        true
    }
}

/// Parameters for one discovery invocation.
#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    /// Query templates to run; empty means the built-in dork templates
    pub queries: Vec<String>,
    /// Result pages per engine per query
    pub pages: usize,
    /// Result budget
    pub max_results: usize,
    /// Engine subset by name; empty means all configured engines
    pub engines: Vec<String>,
    /// Post-hoc record filters
    pub filters: DiscoveryFilters,
    /// Optional final sort
    pub sort_by: Option<SortBy>,
}

impl Default for DiscoveryRequest {
    fn default() -> Self {
        Self {
            queries: Vec::new(),
            pages: crate::config::DEFAULT_SEARCH_PAGES,
            max_results: crate::config::DEFAULT_MAX_RESULTS,
            engines: Vec::new(),
            filters: DiscoveryFilters::default(),
            sort_by: None,
        }
    }
}

/// Result of a discovery invocation: the accepted records plus summary
/// counters echoing the search parameters.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoverySummary {
    /// Accepted store records (length <= the requested budget)
    pub stores: Vec<StoreRecord>,
    /// Derived: number of accepted records
    pub stores_found: usize,
    /// Queries that were actually issued
    pub queries: Vec<String>,
    /// Pages per engine per query
    pub pages: usize,
    /// The requested budget
    pub max_results: usize,
    /// Completion timestamp (UTC, RFC 3339)
    pub finished_at: String,
}
