//! Search-engine adapters.
//!
//! Each supported engine is described by a static `EngineConfig` (query-URL
//! template, pagination rule, extraction rule) and served by the generic
//! `HtmlSerpEngine` adapter. The `SearchEngine` trait is the seam: tests and
//! callers can inject their own implementations (including failing ones)
//! without touching the registry.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use scraper::{Html, Selector};

use crate::config::{PAGE_JITTER_MAX_MS, PAGE_JITTER_MIN_MS};
use crate::error_handling::{ErrorType, ProcessingStats};
use crate::models::SearchQuery;
use crate::user_agent::UserAgentPool;

/// How an engine encodes the result page in its query URL.
#[derive(Debug, Clone, Copy)]
pub enum Pagination {
    /// `{page}` is replaced by `base + page_index * step` (result offset)
    Offset { base: usize, step: usize },
    /// `{page}` is replaced by `base + page_index` (page number)
    PageNumber { base: usize },
}

impl Pagination {
    fn value_for(&self, page_index: usize) -> usize {
        match *self {
            Pagination::Offset { base, step } => base + page_index * step,
            Pagination::PageNumber { base } => base + page_index,
        }
    }
}

/// How candidate URLs are pulled out of an engine's result markup.
#[derive(Debug, Clone, Copy)]
pub enum ExtractRule {
    /// Anchors matching the selector; `href` is the destination
    Anchors { selector: &'static str },
    /// Anchors whose `href` wraps the destination percent-encoded in a query
    /// parameter (e.g. DuckDuckGo's `uddg=`)
    RedirectParam {
        selector: &'static str,
        param: &'static str,
    },
    /// Anchors whose `href` embeds the destination percent-encoded between
    /// two literal markers (e.g. Yahoo's `/RU=...../RK=`)
    DelimitedSegment {
        selector: &'static str,
        start: &'static str,
        end: &'static str,
    },
}

/// Static per-engine descriptor. One instance per supported engine,
/// registered at startup.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Engine name used for logging and subset selection
    pub name: &'static str,
    /// Query-URL template with `{query}` and `{page}` placeholders
    pub template: &'static str,
    /// Pagination rule filling `{page}`
    pub pagination: Pagination,
    /// Result-extraction rule
    pub extract: ExtractRule,
}

/// The configured engine set.
///
/// Google is deliberately absent: its result page requires JS/consent flows
/// that a plain GET cannot parse reliably.
pub static ENGINE_CONFIGS: &[EngineConfig] = &[
    EngineConfig {
        name: "bing",
        template: "https://www.bing.com/search?q={query}&first={page}",
        pagination: Pagination::Offset { base: 1, step: 10 },
        extract: ExtractRule::Anchors {
            selector: "li.b_algo h2 a",
        },
    },
    EngineConfig {
        name: "duckduckgo",
        template: "https://html.duckduckgo.com/html/?q={query}&s={page}",
        pagination: Pagination::Offset { base: 0, step: 30 },
        extract: ExtractRule::RedirectParam {
            selector: "a.result__a",
            param: "uddg",
        },
    },
    EngineConfig {
        name: "mojeek",
        template: "https://www.mojeek.com/search?q={query}&s={page}",
        pagination: Pagination::Offset { base: 1, step: 10 },
        extract: ExtractRule::Anchors {
            selector: "ul.results-standard h2 a",
        },
    },
    EngineConfig {
        name: "ecosia",
        template: "https://www.ecosia.org/search?q={query}&p={page}",
        pagination: Pagination::PageNumber { base: 0 },
        extract: ExtractRule::Anchors {
            selector: "a.result__link",
        },
    },
    EngineConfig {
        name: "startpage",
        template: "https://www.startpage.com/sp/search?query={query}&page={page}",
        pagination: Pagination::PageNumber { base: 1 },
        extract: ExtractRule::Anchors {
            selector: "a.w-gl__result-title",
        },
    },
    EngineConfig {
        name: "yahoo",
        template: "https://search.yahoo.com/search?p={query}&b={page}",
        pagination: Pagination::Offset { base: 1, step: 10 },
        extract: ExtractRule::DelimitedSegment {
            selector: "div.algo h3.title a",
            start: "/RU=",
            end: "/RK",
        },
    },
    EngineConfig {
        name: "brave",
        template: "https://search.brave.com/search?q={query}&offset={page}",
        pagination: Pagination::PageNumber { base: 0 },
        extract: ExtractRule::Anchors {
            selector: "a.result-header",
        },
    },
];

/// A search-engine adapter.
///
/// Implementations must never propagate failures: total failure yields an
/// empty list, never an error out of the adapter.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Engine name for logging and subset selection.
    fn name(&self) -> &str;

    /// Fetches up to `query.pages` result pages and returns the harvested
    /// candidate URLs, deduplicated within this engine's own results.
    async fn search(
        &self,
        client: &reqwest::Client,
        user_agents: &UserAgentPool,
        query: &SearchQuery,
        stats: &ProcessingStats,
    ) -> Vec<String>;
}

/// Generic HTML-SERP adapter driven by an `EngineConfig`.
pub struct HtmlSerpEngine {
    name: String,
    template: String,
    pagination: Pagination,
    extract: ExtractRule,
    /// Inter-page jitter toggle; disabled in tests
    jitter: bool,
}

impl HtmlSerpEngine {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            name: config.name.to_string(),
            template: config.template.to_string(),
            pagination: config.pagination,
            extract: config.extract,
            jitter: true,
        }
    }

    /// Builds an adapter with a custom URL template. Used by tests to point
    /// an engine at a mock server.
    pub fn with_template(
        name: impl Into<String>,
        template: impl Into<String>,
        pagination: Pagination,
        extract: ExtractRule,
    ) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            pagination,
            extract,
            jitter: false,
        }
    }

    fn page_url(&self, query: &str, page_index: usize) -> String {
        let encoded = urlencoding::encode(query);
        self.template
            .replace("{query}", encoded.as_ref())
            .replace("{page}", &self.pagination.value_for(page_index).to_string())
    }

    /// Hostname of the engine itself, used to drop self-referential links.
    fn own_host(&self) -> Option<String> {
        let probe = self.template.replace("{query}", "q").replace("{page}", "0");
        url::Url::parse(&probe)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
    }

    fn extract_urls(&self, body: &str) -> Vec<String> {
        let (selector_str, unwrap): (&str, Box<dyn Fn(&str) -> Option<String>>) =
            match self.extract {
                ExtractRule::Anchors { selector } => (selector, Box::new(take_absolute)),
                ExtractRule::RedirectParam { selector, param } => (
                    selector,
                    Box::new(move |href: &str| unwrap_redirect_param(href, param)),
                ),
                ExtractRule::DelimitedSegment {
                    selector,
                    start,
                    end,
                } => (
                    selector,
                    Box::new(move |href: &str| unwrap_delimited(href, start, end)),
                ),
            };

        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(e) => {
                log::error!("[{}] invalid result selector '{}': {}", self.name, selector_str, e);
                return Vec::new();
            }
        };

        let own_host = self.own_host();
        let document = Html::parse_document(body);
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| unwrap(href))
            .filter(|candidate| match (&own_host, url::Url::parse(candidate)) {
                (Some(host), Ok(parsed)) => parsed
                    .host_str()
                    .map(|h| !h.trim_start_matches("www.").eq_ignore_ascii_case(host))
                    .unwrap_or(false),
                (None, Ok(_)) => true,
                (_, Err(_)) => false,
            })
            .collect()
    }
}

/// Keeps absolute http(s) hrefs only.
fn take_absolute(href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        Some(href.to_string())
    } else {
        None
    }
}

/// Unwraps a redirect-wrapper href whose destination sits percent-encoded in
/// a query parameter.
fn unwrap_redirect_param(href: &str, param: &str) -> Option<String> {
    let needle = format!("{param}=");
    let start = href.find(&needle)? + needle.len();
    let rest = &href[start..];
    let encoded = rest.split('&').next().unwrap_or(rest);
    let decoded = urlencoding::decode(encoded).ok()?;
    take_absolute(&decoded)
}

/// Unwraps a redirect-wrapper href whose destination sits percent-encoded
/// between two literal markers.
fn unwrap_delimited(href: &str, start_marker: &str, end_marker: &str) -> Option<String> {
    let start = href.find(start_marker)? + start_marker.len();
    let rest = &href[start..];
    let encoded = match rest.find(end_marker) {
        Some(end) => &rest[..end],
        None => rest,
    };
    let decoded = urlencoding::decode(encoded).ok()?;
    take_absolute(&decoded)
}

#[async_trait]
impl SearchEngine for HtmlSerpEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        client: &reqwest::Client,
        user_agents: &UserAgentPool,
        query: &SearchQuery,
        stats: &ProcessingStats,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for page_index in 0..query.pages {
            let page_url = self.page_url(&query.query, page_index);
            log::debug!("[{}] fetching page {}: {}", self.name, page_index, page_url);

            let response = client
                .get(&page_url)
                .header(reqwest::header::USER_AGENT, user_agents.pick())
                .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => match resp.text().await {
                    Ok(body) => {
                        let extracted = self.extract_urls(&body);
                        if extracted.is_empty() {
                            log::debug!(
                                "[{}] no results extracted from page {}",
                                self.name,
                                page_index
                            );
                        }
                        for candidate in extracted {
                            if seen.insert(candidate.clone()) {
                                results.push(candidate);
                            }
                        }
                    }
                    Err(e) => {
                        stats.increment_error(ErrorType::EngineParseError);
                        log::warn!("[{}] failed to read page {} body: {}", self.name, page_index, e);
                    }
                },
                Ok(resp) => {
                    stats.increment_error(ErrorType::EngineFetchError);
                    log::warn!(
                        "[{}] page {} returned status {}",
                        self.name,
                        page_index,
                        resp.status()
                    );
                }
                Err(e) => {
                    stats.increment_error(ErrorType::EngineFetchError);
                    log::warn!("[{}] page {} fetch failed: {}", self.name, page_index, e);
                }
            }

            // Sub-second jitter between pages to reduce rate-limiting
            if self.jitter && page_index + 1 < query.pages {
                let delay_ms = {
                    let mut rng = rand::rng();
                    rng.random_range(PAGE_JITTER_MIN_MS..=PAGE_JITTER_MAX_MS)
                };
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }

        log::info!(
            "[{}] harvested {} candidate URLs for query '{}'",
            self.name,
            results.len(),
            query.query
        );
        results
    }
}

/// Builds the default adapter set from the static registry.
pub fn default_engines() -> Vec<Arc<dyn SearchEngine>> {
    ENGINE_CONFIGS
        .iter()
        .map(|config| Arc::new(HtmlSerpEngine::from_config(config)) as Arc<dyn SearchEngine>)
        .collect()
}

/// Names of all configured engines, in registry order.
pub fn list_engines() -> Vec<&'static str> {
    ENGINE_CONFIGS.iter().map(|c| c.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bing_like() -> HtmlSerpEngine {
        HtmlSerpEngine::from_config(&ENGINE_CONFIGS[0])
    }

    #[test]
    fn test_list_engines_matches_registry() {
        let names = list_engines();
        assert_eq!(names.len(), ENGINE_CONFIGS.len());
        assert!(names.contains(&"bing"));
        assert!(names.contains(&"duckduckgo"));
        assert!(!names.contains(&"google"));
    }

    #[test]
    fn test_page_url_encodes_query_and_offset() {
        let engine = bing_like();
        let url = engine.page_url("\"add to cart\" shop", 1);
        assert!(url.contains("q=%22add%20to%20cart%22%20shop"));
        // Offset pagination: base 1, step 10 -> second page starts at 11
        assert!(url.ends_with("&first=11"));
    }

    #[test]
    fn test_extract_plain_anchors_skips_relative_and_self_links() {
        let engine = bing_like();
        let body = r#"
            <html><body>
              <li class="b_algo"><h2><a href="https://shop.example/a">A</a></h2></li>
              <li class="b_algo"><h2><a href="/internal">rel</a></h2></li>
              <li class="b_algo"><h2><a href="https://www.bing.com/more">self</a></h2></li>
            </body></html>
        "#;
        let urls = engine.extract_urls(body);
        assert_eq!(urls, vec!["https://shop.example/a".to_string()]);
    }

    #[test]
    fn test_unwrap_redirect_param_decodes_destination() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fshop.example%2Fp%3Fid%3D1&rut=abc";
        assert_eq!(
            unwrap_redirect_param(href, "uddg"),
            Some("https://shop.example/p?id=1".to_string())
        );
    }

    #[test]
    fn test_unwrap_redirect_param_missing_param() {
        assert_eq!(unwrap_redirect_param("https://x/?q=1", "uddg"), None);
    }

    #[test]
    fn test_unwrap_delimited_yahoo_style() {
        let href = "https://r.search.yahoo.com/_ylt=x/RU=https%3A%2F%2Fshop.example%2F/RK=2/RS=y";
        assert_eq!(
            unwrap_delimited(href, "/RU=", "/RK"),
            Some("https://shop.example/".to_string())
        );
    }

    #[test]
    fn test_unwrap_delimited_rejects_non_http() {
        let href = "https://r.search.yahoo.com/RU=javascript%3Avoid(0)/RK=2";
        assert_eq!(unwrap_delimited(href, "/RU=", "/RK"), None);
    }

    #[test]
    fn test_pagination_value_math() {
        let offset = Pagination::Offset { base: 1, step: 10 };
        assert_eq!(offset.value_for(0), 1);
        assert_eq!(offset.value_for(2), 21);

        let page = Pagination::PageNumber { base: 1 };
        assert_eq!(page.value_for(0), 1);
        assert_eq!(page.value_for(3), 4);
    }
}
