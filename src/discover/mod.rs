//! Discovery orchestration.
//!
//! Ties the subsystems together: expands query templates, gathers an
//! oversampled candidate pool from the search fan-out, screens it through the
//! protection filter, runs the analysis pipeline over the survivors with a
//! bounded worker pool, applies the caller's record filters, and closes the
//! result set at the requested budget.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::analyze::{AnalyzeOptions, StoreAnalysisPipeline};
use crate::app::validate_and_normalize_url;
use crate::config::{NotifyConfig, SortBy, OVERSAMPLE_FACTOR};
use crate::error_handling::{InfoType, ProcessingStats};
use crate::filter::ProtectionFilter;
use crate::models::{DiscoveryRequest, DiscoverySummary, SearchQuery, StoreRecord};
use crate::notify::send_summary_notification;
use crate::price::parse_prices;
use crate::search::MultiEngineSearcher;

/// Built-in dork templates used when the caller supplies no queries.
///
/// Each template targets a different store footprint so the merged candidate
/// pool isn't dominated by one platform.
pub static DEFAULT_DORK_TEMPLATES: &[&str] = &[
    "intext:\"add to cart\" intext:\"checkout\"",
    "intext:\"powered by shopify\" intext:\"buy now\"",
    "intext:\"powered by woocommerce\" intext:\"add to cart\"",
    "inurl:product intext:\"add to cart\" intext:\"credit card\"",
    "intext:\"secure checkout\" intext:\"free shipping\"",
];

/// Orchestrates one discovery run end to end.
pub struct DiscoveryOrchestrator {
    searcher: MultiEngineSearcher,
    filter: ProtectionFilter,
    pipeline: Arc<StoreAnalysisPipeline>,
    stats: Arc<ProcessingStats>,
    analysis_concurrency: usize,
    notify: Option<NotifyConfig>,
    notify_client: Arc<reqwest::Client>,
}

impl DiscoveryOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        searcher: MultiEngineSearcher,
        filter: ProtectionFilter,
        pipeline: Arc<StoreAnalysisPipeline>,
        stats: Arc<ProcessingStats>,
        analysis_concurrency: usize,
        notify: Option<NotifyConfig>,
        notify_client: Arc<reqwest::Client>,
    ) -> Self {
        Self {
            searcher,
            filter,
            pipeline,
            stats,
            analysis_concurrency,
            notify,
            notify_client,
        }
    }

    /// Expands the effective query list for a request.
    ///
    /// Caller-supplied queries win; otherwise the built-in templates are
    /// used, with a price-targeted variant appended when the request filters
    /// on a target price.
    fn effective_queries(request: &DiscoveryRequest) -> Vec<String> {
        if !request.queries.is_empty() {
            return request.queries.clone();
        }
        let mut queries: Vec<String> =
            DEFAULT_DORK_TEMPLATES.iter().map(|t| t.to_string()).collect();
        if let Some(price) = request.filters.target_price {
            queries.push(format!(
                "intext:\"add to cart\" intext:\"${price:.2}\""
            ));
        }
        queries
    }

    /// Builds the clear-URL pool query by query: search fan-out, then the
    /// protection filter over each query's fresh candidates. Later queries
    /// are skipped once the oversampled pool target is reached.
    async fn gather_clear_pool(&self, queries: &[String], pages: usize, target: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut pool = Vec::new();

        for query in queries {
            if pool.len() >= target {
                log::debug!("Clear-URL pool full, skipping remaining queries");
                break;
            }

            let search_query = SearchQuery::new(query.clone(), pages);
            let mut batch = Vec::new();
            for url in self.searcher.search_all(&search_query).await {
                let Some(normalized) = validate_and_normalize_url(&url) else {
                    continue;
                };
                if seen.insert(normalized.clone()) {
                    batch.push(normalized);
                }
            }

            let remaining = target - pool.len();
            pool.extend(self.filter.filter_urls(&batch, remaining).await);
        }
        pool
    }

    /// Runs a full discovery pass and returns the accepted records.
    ///
    /// Never errors: an empty result set with populated counters is the
    /// worst-case outcome.
    pub async fn discover(&self, request: &DiscoveryRequest) -> DiscoverySummary {
        let queries = Self::effective_queries(request);
        let pool_target = request.max_results.saturating_mul(OVERSAMPLE_FACTOR).max(1);

        log::info!(
            "Discovery: {} queries, {} pages/engine, budget {} (pool target {})",
            queries.len(),
            request.pages,
            request.max_results,
            pool_target
        );

        let survivors = self
            .gather_clear_pool(&queries, request.pages, pool_target)
            .await;

        let semaphore = Arc::new(Semaphore::new(self.analysis_concurrency.max(1)));
        let options = AnalyzeOptions::default();
        let mut tasks = FuturesUnordered::new();
        for url in &survivors {
            let url = url.clone();
            let semaphore = Arc::clone(&semaphore);
            let pipeline = Arc::clone(&self.pipeline);
            let options = options.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                pipeline.analyze(&url, &options).await
            }));
        }

        let mut stores: Vec<StoreRecord> = Vec::new();
        while let Some(joined) = tasks.next().await {
            let record = match joined {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    log::error!("Analysis task panicked: {}", e);
                    continue;
                }
            };

            let parsed = parse_prices(&record.prices_found);
            if !request.filters.accepts(&record, &parsed) {
                log::debug!("Record for {} rejected by filters", record.url);
                continue;
            }
            if stores.len() < request.max_results {
                stores.push(record);
            } else {
                self.stats.increment_info(InfoType::BudgetOverflowDiscarded);
            }
        }

        if let Some(sort_by) = request.sort_by {
            sort_records(&mut stores, sort_by);
        }

        let summary = DiscoverySummary {
            stores_found: stores.len(),
            stores,
            queries,
            pages: request.pages,
            max_results: request.max_results,
            finished_at: chrono::Utc::now().to_rfc3339(),
        };

        log::info!(
            "Discovery finished: {} stores accepted ({} errors, {} skips counted)",
            summary.stores_found,
            self.stats.total_errors(),
            self.stats.total_info()
        );

        if let Some(notify) = &self.notify {
            let client = Arc::clone(&self.notify_client);
            let notify = notify.clone();
            let stats = Arc::clone(&self.stats);
            let summary = summary.clone();
            // Fire-and-forget; a slow or broken sink never delays the caller
            tokio::spawn(async move {
                send_summary_notification(&client, &notify, &summary, &stats).await;
            });
        }

        summary
    }
}

/// Applies the requested final ordering.
fn sort_records(records: &mut [StoreRecord], sort_by: SortBy) {
    match sort_by {
        SortBy::Gateways => {
            records.sort_by(|a, b| b.gateway_count.cmp(&a.gateway_count));
        }
        SortBy::Price => {
            records.sort_by(|a, b| {
                a.average_price
                    .partial_cmp(&b.average_price)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }
}
