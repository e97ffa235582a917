//! Protection filtering.
//!
//! Screens candidate URLs before they reach the analysis pipeline. Two
//! passes: a free pass dropping well-known non-store domains by hostname, and
//! a probe pass fetching each survivor once and scanning the body for
//! CAPTCHA/WAF challenge markers. The probe pass is deliberately
//! conservative: any fetch failure counts as protected, since a URL that
//! cannot be probed cannot be analyzed either.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::error_handling::{ErrorType, InfoType, ProcessingStats};
use crate::gateway::has_protection_signature;
use crate::models::ProtectionVerdict;
use crate::user_agent::UserAgentPool;

/// Domains that search engines surface constantly but that are never stores
/// worth analyzing. Matched by hostname suffix so subdomains are covered.
pub static EXCLUDED_DOMAINS: &[&str] = &[
    "google.com",
    "bing.com",
    "duckduckgo.com",
    "yahoo.com",
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "youtube.com",
    "linkedin.com",
    "pinterest.com",
    "reddit.com",
    "tiktok.com",
    "wikipedia.org",
    "amazon.com",
    "ebay.com",
    "etsy.com",
    "aliexpress.com",
    "walmart.com",
    "quora.com",
    "medium.com",
    "github.com",
];

/// True iff the URL's hostname is one of the excluded domains or a subdomain
/// of one. Unparseable URLs are excluded too.
pub fn is_excluded_domain(url: &str) -> bool {
    let host = match url::Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(h) => h.to_lowercase(),
            None => return true,
        },
        Err(_) => return true,
    };
    EXCLUDED_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
}

/// Concurrent pre-analysis URL screen.
pub struct ProtectionFilter {
    client: Arc<reqwest::Client>,
    user_agents: Arc<UserAgentPool>,
    stats: Arc<ProcessingStats>,
    concurrency: usize,
}

impl ProtectionFilter {
    pub fn new(
        client: Arc<reqwest::Client>,
        user_agents: Arc<UserAgentPool>,
        stats: Arc<ProcessingStats>,
        concurrency: usize,
    ) -> Self {
        Self {
            client,
            user_agents,
            stats,
            concurrency: concurrency.max(1),
        }
    }

    /// Probes one URL and decides whether it is behind a protection layer.
    ///
    /// A non-success status, a fetch error, or a body carrying a challenge
    /// signature all mean protected.
    pub async fn probe(&self, url: &str) -> ProtectionVerdict {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.user_agents.pick())
            .send()
            .await;

        let is_protected = match response {
            Ok(resp) => {
                let status = resp.status();
                match resp.text().await {
                    Ok(body) => !status.is_success() || has_protection_signature(&body),
                    Err(e) => {
                        self.stats.increment_error(ErrorType::ProbeFetchError);
                        log::debug!("Probe body read failed for {}: {}", url, e);
                        true
                    }
                }
            }
            Err(e) => {
                if e.is_timeout() {
                    self.stats.increment_error(ErrorType::ProbeTimeout);
                } else {
                    self.stats.increment_error(ErrorType::ProbeFetchError);
                }
                log::debug!("Probe fetch failed for {}: {}", url, e);
                true
            }
        };

        ProtectionVerdict {
            url: url.to_string(),
            is_protected,
        }
    }

    /// Screens a candidate list and returns up to `max_results` clear URLs.
    ///
    /// Excluded domains are dropped without a probe. Probes are kept at most
    /// `concurrency` in flight and stop being submitted as soon as the budget
    /// is filled; candidates never probed are left uncounted. Survivor order
    /// follows probe completion, not input order. Protected URLs and probe
    /// failures are counted but never error the call.
    pub async fn filter_urls(&self, candidates: &[String], max_results: usize) -> Vec<String> {
        let mut probe_list = Vec::new();
        for url in candidates {
            if is_excluded_domain(url) {
                self.stats.increment_info(InfoType::ExcludedDomainSkipped);
                log::debug!("Skipping excluded domain: {}", url);
            } else {
                probe_list.push(url.clone());
            }
        }

        let mut pending = probe_list.into_iter();
        let mut tasks = FuturesUnordered::new();
        let mut survivors = Vec::new();

        loop {
            while tasks.len() < self.concurrency && survivors.len() < max_results {
                let Some(url) = pending.next() else {
                    break;
                };
                tasks.push(async move { self.probe(&url).await });
            }
            if survivors.len() >= max_results {
                break;
            }

            let Some(verdict) = tasks.next().await else {
                break;
            };
            if verdict.is_protected {
                self.stats.increment_info(InfoType::ProtectedUrlSkipped);
                log::info!("Filtered out protected URL: {}", verdict.url);
            } else {
                survivors.push(verdict.url);
            }
        }

        log::info!(
            "Protection filter: {} candidates -> {} survivors (budget {})",
            candidates.len(),
            survivors.len(),
            max_results
        );
        survivors
    }
}
