//! Store analysis pipeline.
//!
//! Fetches a URL, classifies it as a store, fingerprints its payment
//! gateways, probes checkout and account subpages for evidence the landing
//! page lacks, and extracts prices. Produces a `StoreRecord` for real stores
//! and nothing at all for everything else. Environmental failures are counted
//! and absorbed; only the caller's input contract can error.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::HeaderMap;
use scraper::Html;
use tokio_retry::RetryIf;

use crate::cache::RecordCache;
use crate::classify::classify;
use crate::config::{ANALYSIS_TIMEOUT, MAX_RESPONSE_BODY_SIZE, SUBPAGE_FETCH_TIMEOUT_SECS};
use crate::error_handling::{
    categorize_reqwest_error, get_retry_strategy, is_retriable_error, ErrorType, InfoType,
    ProcessingStats,
};
use crate::gateway::{detect_signals, find_gateways};
use crate::models::StoreRecord;
use crate::price::{extract_prices, parse_prices, price_stats};
use crate::user_agent::UserAgentPool;

/// Checkout-flow subpaths probed for gateway evidence that often only appears
/// once the checkout SDK loads.
const CHECKOUT_SUBPATHS: &[&str] = &["/checkout", "/payment", "/pay"];

/// Subpath probed for an authentication flow.
const ACCOUNT_SUBPATH: &str = "/my-account";

/// Per-call analysis toggles.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Probe checkout subpages for additional gateway evidence
    pub deep_gateway_scan: bool,
    /// Probe the account subpage for an auth flow
    pub auth_check: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            deep_gateway_scan: true,
            auth_check: true,
        }
    }
}

/// The per-URL analysis pipeline. Shared across the discovery worker pool.
pub struct StoreAnalysisPipeline {
    client: Arc<reqwest::Client>,
    user_agents: Arc<UserAgentPool>,
    stats: Arc<ProcessingStats>,
    cache: Arc<RecordCache>,
}

impl StoreAnalysisPipeline {
    pub fn new(
        client: Arc<reqwest::Client>,
        user_agents: Arc<UserAgentPool>,
        stats: Arc<ProcessingStats>,
        cache: Arc<RecordCache>,
    ) -> Self {
        Self {
            client,
            user_agents,
            stats,
            cache,
        }
    }

    /// Analyzes one URL end to end.
    ///
    /// Returns `Some(record)` only for a reachable page that classifies as a
    /// real store. Fetch failures, timeouts, and not-a-store verdicts all
    /// yield `None` and a counter increment. Cached URLs short-circuit
    /// without any network traffic.
    pub async fn analyze(&self, url: &str, options: &AnalyzeOptions) -> Option<StoreRecord> {
        if let Some(hit) = self.cache.get(url) {
            self.stats.increment_info(InfoType::CacheHit);
            log::debug!("Cache hit for {}", url);
            return Some(hit);
        }

        match tokio::time::timeout(ANALYSIS_TIMEOUT, self.analyze_uncached(url, options)).await {
            Ok(record) => record,
            Err(_) => {
                self.stats.increment_error(ErrorType::AnalysisTimeout);
                log::warn!(
                    "Analysis of {} exceeded {}s, abandoned",
                    url,
                    ANALYSIS_TIMEOUT.as_secs()
                );
                None
            }
        }
    }

    /// Searches records cached by earlier `analyze` calls on this pipeline.
    ///
    /// Matches the record URL or any gateway name, case-insensitively. Serves
    /// repeat lookups without refetching anything.
    pub fn search_cached(&self, keyword: &str) -> Vec<StoreRecord> {
        self.cache.search(keyword)
    }

    async fn analyze_uncached(&self, url: &str, options: &AnalyzeOptions) -> Option<StoreRecord> {
        let fetched = RetryIf::spawn(
            get_retry_strategy(),
            || self.fetch_page(url, None),
            is_retriable_error,
        )
        .await;

        let (body, headers) = match fetched {
            Ok(page) => page,
            Err(e) => {
                let error_type = e
                    .chain()
                    .find_map(|cause| cause.downcast_ref::<reqwest::Error>())
                    .map(categorize_reqwest_error)
                    .unwrap_or(ErrorType::StoreFetchError);
                self.stats.increment_error(error_type);
                log::warn!("Failed to fetch {}: {:#}", url, e);
                return None;
            }
        };

        // Html is not Send; keep the document inside a sync scope so the
        // surrounding future stays spawnable
        let is_real_store = {
            let document = Html::parse_document(&body);
            classify(&document, &body)
        };
        if !is_real_store {
            self.stats.increment_info(InfoType::NotAStore);
            log::info!("{} did not classify as a store", url);
            return None;
        }

        let mut gateways = find_gateways(&body);
        let mut signals = detect_signals(&body, Some(&headers));

        if options.deep_gateway_scan {
            for subpath in CHECKOUT_SUBPATHS {
                let Some(sub_url) = join_subpath(url, subpath) else {
                    continue;
                };
                match self
                    .fetch_page(&sub_url, Some(Duration::from_secs(SUBPAGE_FETCH_TIMEOUT_SECS)))
                    .await
                {
                    Ok((sub_body, sub_headers)) => {
                        gateways.extend(find_gateways(&sub_body));
                        signals.merge(detect_signals(&sub_body, Some(&sub_headers)));
                    }
                    Err(e) => {
                        self.stats.increment_error(ErrorType::CheckoutProbeError);
                        log::debug!("Checkout probe {} failed: {:#}", sub_url, e);
                    }
                }
            }
        }

        if options.auth_check && !signals.has_auth {
            if let Some(account_url) = join_subpath(url, ACCOUNT_SUBPATH) {
                match self
                    .fetch_page(
                        &account_url,
                        Some(Duration::from_secs(SUBPAGE_FETCH_TIMEOUT_SECS)),
                    )
                    .await
                {
                    // A served account page is an auth flow regardless of its
                    // exact markup
                    Ok(_) => signals.has_auth = true,
                    Err(e) => {
                        log::debug!("Account probe {} failed: {:#}", account_url, e);
                    }
                }
            }
        }

        let prices_found = extract_prices(&body);
        let parsed = parse_prices(&prices_found);
        let stats = price_stats(&parsed);

        let record = StoreRecord::new(
            url.to_string(),
            true,
            gateways,
            signals.has_captcha,
            signals.has_cloudflare,
            signals.has_vbv,
            signals.has_auth,
            prices_found,
            stats.average,
            stats.min,
            stats.max,
        );
        self.cache.insert(record.clone());
        log::info!(
            "Analyzed {}: {} gateways, {} prices",
            url,
            record.gateway_count,
            record.prices_found.len()
        );
        Some(record)
    }

    /// Fetches one page, capping the body at `MAX_RESPONSE_BODY_SIZE`.
    ///
    /// A non-success status is surfaced through `error_for_status` so the
    /// retry layer sees a `reqwest::Error` carrying the status code: 4xx is
    /// not retried, 429/5xx is.
    async fn fetch_page(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<(String, HeaderMap)> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.user_agents.pick());
        if let Some(t) = timeout {
            request = request.timeout(t);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("{url} returned an error status"))?;
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .with_context(|| format!("reading body of {url} failed"))?;
        Ok((truncate_to_char_boundary(body, MAX_RESPONSE_BODY_SIZE), headers))
    }
}

/// Joins a probe subpath onto an analyzed URL, replacing its path.
fn join_subpath(base: &str, subpath: &str) -> Option<String> {
    url::Url::parse(base)
        .ok()
        .and_then(|u| u.join(subpath).ok())
        .map(|u| u.to_string())
}

fn truncate_to_char_boundary(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut cut = max;
        while cut > 0 && !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}
