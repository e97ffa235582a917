//! storeprobe library: e-commerce store discovery and gateway fingerprinting
//!
//! This library provides high-level APIs for analyzing individual store URLs
//! and for discovering stores at scale via multi-engine dork searches. An
//! analysis classifies a page as a real store, fingerprints its payment
//! gateways, detects protection layers (CAPTCHA, Cloudflare, 3-D Secure), and
//! extracts prices.
//!
//! # Example
//!
//! ```no_run
//! use storeprobe::{discover, Config, DiscoveryRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let request = DiscoveryRequest {
//!     max_results: 10,
//!     ..Default::default()
//! };
//!
//! let summary = discover(&config, &request).await?;
//! println!("Found {} stores", summary.stores_found);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

pub mod analyze;
mod app;
pub mod cache;
pub mod classify;
pub mod config;
pub mod discover;
pub mod error_handling;
pub mod filter;
pub mod gateway;
pub mod initialization;
pub mod models;
mod notify;
pub mod price;
pub mod search;
pub mod user_agent;

// Re-export public API
pub use analyze::{AnalyzeOptions, StoreAnalysisPipeline};
pub use cache::RecordCache;
pub use config::{Config, LogFormat, LogLevel, NotifyConfig, SortBy};
pub use error_handling::{ErrorType, InfoType, InputError, ProcessingStats};
pub use models::{
    DiscoveryFilters, DiscoveryRequest, DiscoverySummary, SearchQuery, StoreRecord,
};
pub use run::{analyze_one, discover};
pub use search::{default_engines, list_engines, MultiEngineSearcher, SearchEngine};

// Internal run module (wires the subsystems together from a Config)
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};

    use crate::analyze::{AnalyzeOptions, StoreAnalysisPipeline};
    use crate::app::validate_and_normalize_url;
    use crate::cache::RecordCache;
    use crate::config::Config;
    use crate::discover::DiscoveryOrchestrator;
    use crate::error_handling::{InputError, ProcessingStats};
    use crate::filter::ProtectionFilter;
    use crate::initialization::{init_client, init_probe_client};
    use crate::models::{DiscoveryRequest, DiscoverySummary, StoreRecord};
    use crate::search::{default_engines, MultiEngineSearcher};
    use crate::user_agent::UserAgentPool;

    /// Analyzes a single URL.
    ///
    /// Returns `Ok(None)` when the page is reachable but does not classify as
    /// a real store, or when it cannot be fetched at all. The only `Err`
    /// cases are an invalid input URL and client construction failure.
    pub async fn analyze_one(
        config: &Config,
        url: &str,
        options: &AnalyzeOptions,
    ) -> Result<Option<StoreRecord>> {
        let normalized = validate_and_normalize_url(url)
            .ok_or_else(|| InputError::InvalidUrl(url.to_string()))?;

        let client = init_client(config).context("failed to initialize HTTP client")?;
        let user_agents = Arc::new(UserAgentPool::from_override(config.user_agent.as_deref()));
        let stats = Arc::new(ProcessingStats::new());
        let cache = Arc::new(RecordCache::new(config.cache_capacity));
        let pipeline = StoreAnalysisPipeline::new(client, user_agents, stats, cache);

        Ok(pipeline.analyze(&normalized, options).await)
    }

    /// Runs a full discovery pass: dork search fan-out, protection filtering,
    /// concurrent analysis, post-hoc filters, budget close.
    ///
    /// This is the main entry point for the library. It never fails on
    /// environmental problems; the only `Err` cases are an invalid numeric
    /// filter and client construction failure.
    pub async fn discover(
        config: &Config,
        request: &DiscoveryRequest,
    ) -> Result<DiscoverySummary> {
        if let Some(price) = request.filters.target_price {
            if !price.is_finite() || price < 0.0 {
                return Err(InputError::InvalidNumber {
                    name: "target_price",
                    value: price.to_string(),
                }
                .into());
            }
        }

        let client = init_client(config).context("failed to initialize HTTP client")?;
        let probe_client =
            init_probe_client(config).context("failed to initialize probe client")?;
        let user_agents = Arc::new(UserAgentPool::from_override(config.user_agent.as_deref()));
        let stats = Arc::new(ProcessingStats::new());
        let cache = Arc::new(RecordCache::new(config.cache_capacity));

        let mut searcher = MultiEngineSearcher::new(
            default_engines(),
            Arc::clone(&client),
            Arc::clone(&user_agents),
            Arc::clone(&stats),
            config.search_concurrency,
        );
        if !request.engines.is_empty() {
            searcher = searcher.with_engine_subset(&request.engines);
        }

        let filter = ProtectionFilter::new(
            probe_client,
            Arc::clone(&user_agents),
            Arc::clone(&stats),
            config.probe_concurrency,
        );

        let pipeline = Arc::new(StoreAnalysisPipeline::new(
            Arc::clone(&client),
            user_agents,
            Arc::clone(&stats),
            cache,
        ));

        let orchestrator = DiscoveryOrchestrator::new(
            searcher,
            filter,
            pipeline,
            stats,
            config.analysis_concurrency,
            config.notify.clone(),
            client,
        );

        Ok(orchestrator.discover(request).await)
    }
}
