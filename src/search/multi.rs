//! Multi-engine scatter-gather.
//!
//! Fans one query out to every configured engine as its own task, bounds each
//! task with a hard timeout, and merges the harvested URLs. Engines are
//! isolated failure domains: one engine hanging, erroring, or returning
//! garbage never affects the others' results.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::config::ENGINE_TASK_TIMEOUT_SECS;
use crate::error_handling::{ErrorType, ProcessingStats};
use crate::models::SearchQuery;
use crate::search::engines::SearchEngine;
use crate::user_agent::UserAgentPool;

/// Runs a query across a set of search-engine adapters concurrently.
pub struct MultiEngineSearcher {
    engines: Vec<Arc<dyn SearchEngine>>,
    client: Arc<reqwest::Client>,
    user_agents: Arc<UserAgentPool>,
    stats: Arc<ProcessingStats>,
    /// 0 means unbounded (one in-flight task per engine)
    concurrency: usize,
}

impl MultiEngineSearcher {
    pub fn new(
        engines: Vec<Arc<dyn SearchEngine>>,
        client: Arc<reqwest::Client>,
        user_agents: Arc<UserAgentPool>,
        stats: Arc<ProcessingStats>,
        concurrency: usize,
    ) -> Self {
        Self {
            engines,
            client,
            user_agents,
            stats,
            concurrency,
        }
    }

    /// Names of the engines this searcher will fan out to.
    pub fn engine_names(&self) -> Vec<String> {
        self.engines.iter().map(|e| e.name().to_string()).collect()
    }

    /// Restricts the searcher to a named subset of its engines.
    ///
    /// Unknown names are logged and skipped; an empty or all-unknown subset
    /// leaves the searcher with no engines, and searches return empty.
    pub fn with_engine_subset(mut self, names: &[String]) -> Self {
        let wanted: HashSet<String> = names.iter().map(|n| n.to_lowercase()).collect();
        for name in &wanted {
            if !self.engines.iter().any(|e| e.name() == name) {
                log::warn!("Unknown search engine '{}' requested, skipping", name);
            }
        }
        self.engines
            .retain(|e| wanted.contains(&e.name().to_lowercase()));
        self
    }

    /// Fans the query out to every engine and merges the results.
    ///
    /// Each engine runs as a spawned task under a hard per-task timeout.
    /// Results are merged in engine-registry order and deduplicated by exact
    /// string match, first occurrence wins. This method never errors; the
    /// worst case is an empty list.
    pub async fn search_all(&self, query: &SearchQuery) -> Vec<String> {
        if self.engines.is_empty() {
            log::warn!("No search engines configured, returning no results");
            return Vec::new();
        }

        let semaphore = match self.concurrency {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n))),
        };

        let mut tasks = FuturesUnordered::new();
        for (index, engine) in self.engines.iter().enumerate() {
            let engine = Arc::clone(engine);
            let client = Arc::clone(&self.client);
            let user_agents = Arc::clone(&self.user_agents);
            let stats = Arc::clone(&self.stats);
            let query = query.clone();
            let semaphore = semaphore.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = match semaphore {
                    Some(sem) => match sem.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_) => return (index, Vec::new()),
                    },
                    None => None,
                };

                let deadline = Duration::from_secs(ENGINE_TASK_TIMEOUT_SECS);
                match tokio::time::timeout(
                    deadline,
                    engine.search(&client, &user_agents, &query, &stats),
                )
                .await
                {
                    Ok(urls) => (index, urls),
                    Err(_) => {
                        stats.increment_error(ErrorType::EngineTaskTimeout);
                        log::warn!(
                            "[{}] timed out after {}s, discarding its results",
                            engine.name(),
                            ENGINE_TASK_TIMEOUT_SECS
                        );
                        (index, Vec::new())
                    }
                }
            }));
        }

        // Collect per-engine buckets so the merge order is registry order,
        // not completion order
        let mut buckets: Vec<Vec<String>> = vec![Vec::new(); self.engines.len()];
        while let Some(joined) = tasks.next().await {
            match joined {
                Ok((index, urls)) => buckets[index] = urls,
                Err(e) => {
                    self.stats.increment_error(ErrorType::EngineFetchError);
                    log::error!("Search engine task panicked: {}", e);
                }
            }
        }

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for bucket in buckets {
            for url in bucket {
                if seen.insert(url.clone()) {
                    merged.push(url);
                }
            }
        }

        log::info!(
            "Query '{}' produced {} unique URLs across {} engines",
            query.query,
            merged.len(),
            self.engines.len()
        );
        merged
    }
}
