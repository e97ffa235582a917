//! Integration tests for the search fan-out and the discovery orchestrator.
//!
//! The SERP tests point a generic engine adapter at a mock server serving
//! canned result markup. The orchestrator tests wire the whole flow together
//! with an injected engine, so budgets and filters are exercised end to end
//! without any real search traffic.

use std::sync::Arc;

use async_trait::async_trait;
use storeprobe::analyze::StoreAnalysisPipeline;
use storeprobe::cache::RecordCache;
use storeprobe::config::SortBy;
use storeprobe::discover::DiscoveryOrchestrator;
use storeprobe::error_handling::ProcessingStats;
use storeprobe::filter::ProtectionFilter;
use storeprobe::models::{DiscoveryFilters, DiscoveryRequest, SearchQuery};
use storeprobe::search::engines::{ExtractRule, HtmlSerpEngine, Pagination};
use storeprobe::search::{MultiEngineSearcher, SearchEngine};
use storeprobe::user_agent::UserAgentPool;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(timeout_secs: u64) -> Arc<reqwest::Client> {
    Arc::new(
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("client"),
    )
}

fn ua_pool() -> Arc<UserAgentPool> {
    Arc::new(UserAgentPool::fixed("storeprobe_test/1.0"))
}

#[tokio::test]
async fn test_serp_engine_paginates_and_dedups() {
    let mock_server = MockServer::start().await;

    let page_one = r#"<html><body>
        <li class="b_algo"><h2><a href="https://shop-a.example/">A</a></h2></li>
        <li class="b_algo"><h2><a href="https://shop-b.example/">B</a></h2></li>
    </body></html>"#;
    let page_two = r#"<html><body>
        <li class="b_algo"><h2><a href="https://shop-b.example/">B again</a></h2></li>
        <li class="b_algo"><h2><a href="https://shop-c.example/">C</a></h2></li>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/serp"))
        .and(query_param("first", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_one))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/serp"))
        .and(query_param("first", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_two))
        .mount(&mock_server)
        .await;

    let engine = HtmlSerpEngine::with_template(
        "mock",
        format!("{}/serp?q={{query}}&first={{page}}", mock_server.uri()),
        Pagination::Offset { base: 1, step: 10 },
        ExtractRule::Anchors {
            selector: "li.b_algo h2 a",
        },
    );

    let stats = ProcessingStats::new();
    let urls = engine
        .search(
            &test_client(3),
            &UserAgentPool::fixed("storeprobe_test/1.0"),
            &SearchQuery::new("add to cart", 2),
            &stats,
        )
        .await;

    assert_eq!(
        urls,
        vec![
            "https://shop-a.example/".to_string(),
            "https://shop-b.example/".to_string(),
            "https://shop-c.example/".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_serp_engine_absorbs_error_pages() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&mock_server)
        .await;

    let engine = HtmlSerpEngine::with_template(
        "mock",
        format!("{}/serp?q={{query}}&p={{page}}", mock_server.uri()),
        Pagination::PageNumber { base: 0 },
        ExtractRule::Anchors { selector: "a" },
    );

    let stats = ProcessingStats::new();
    let urls = engine
        .search(
            &test_client(3),
            &UserAgentPool::fixed("storeprobe_test/1.0"),
            &SearchQuery::new("add to cart", 1),
            &stats,
        )
        .await;

    assert!(urls.is_empty());
    assert!(stats.total_errors() >= 1);
}

/// Injected engine that "finds" a fixed set of store URLs.
struct SeededEngine {
    urls: Vec<String>,
}

#[async_trait]
impl SearchEngine for SeededEngine {
    fn name(&self) -> &str {
        "seeded"
    }

    async fn search(
        &self,
        _client: &reqwest::Client,
        _user_agents: &UserAgentPool,
        _query: &SearchQuery,
        _stats: &ProcessingStats,
    ) -> Vec<String> {
        self.urls.clone()
    }
}

fn store_body(extra: &str) -> String {
    format!(
        r#"<html><body>
        <p>Add to cart and checkout with free shipping.</p>
        <p>Price: $12.00</p>
        {extra}
        </body></html>"#
    )
}

/// Mounts three store pages and one blog page on the mock server and returns
/// their URLs in a deterministic order.
async fn mount_store_fixtures(mock_server: &MockServer) -> Vec<String> {
    let one_gateway = store_body(r#"<script src="https://js.stripe.com/v3/"></script>"#);
    let two_gateways = store_body(
        r#"<script src="https://js.stripe.com/v3/"></script>
           <script src="https://www.paypal.com/sdk/js"></script>"#,
    );
    let three_gateways = store_body(
        r#"<script src="https://js.stripe.com/v3/"></script>
           <script src="https://www.paypal.com/sdk/js"></script>
           <script src="https://x.klarnacdn.net/kp/lib/v1/api.js"></script>"#,
    );
    let blog = "<html><body><p>Repotting ferns today.</p></body></html>";

    for (route, body) in [
        ("/s1", one_gateway.as_str()),
        ("/s2", two_gateways.as_str()),
        ("/s3", three_gateways.as_str()),
        ("/blog", blog),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(mock_server)
            .await;
    }

    ["/s1", "/s2", "/s3", "/blog"]
        .iter()
        .map(|route| format!("{}{}", mock_server.uri(), route))
        .collect()
}

fn orchestrator_for(urls: Vec<String>) -> DiscoveryOrchestrator {
    let client = test_client(5);
    let user_agents = ua_pool();
    let stats = Arc::new(ProcessingStats::new());
    let cache = Arc::new(RecordCache::new(64));

    let searcher = MultiEngineSearcher::new(
        vec![Arc::new(SeededEngine { urls }) as Arc<dyn SearchEngine>],
        Arc::clone(&client),
        Arc::clone(&user_agents),
        Arc::clone(&stats),
        0,
    );
    let filter = ProtectionFilter::new(
        Arc::clone(&client),
        Arc::clone(&user_agents),
        Arc::clone(&stats),
        4,
    );
    let pipeline = Arc::new(StoreAnalysisPipeline::new(
        Arc::clone(&client),
        user_agents,
        Arc::clone(&stats),
        cache,
    ));
    DiscoveryOrchestrator::new(searcher, filter, pipeline, stats, 4, None, client)
}

#[tokio::test]
async fn test_discovery_skips_non_stores_and_reports_the_rest() {
    let mock_server = MockServer::start().await;
    let urls = mount_store_fixtures(&mock_server).await;
    let orchestrator = orchestrator_for(urls);

    let request = DiscoveryRequest {
        queries: vec!["seeded".to_string()],
        pages: 1,
        max_results: 10,
        ..Default::default()
    };
    let summary = orchestrator.discover(&request).await;

    assert_eq!(summary.stores_found, 3, "the blog page must not appear");
    assert_eq!(summary.stores.len(), summary.stores_found);
    assert!(summary
        .stores
        .iter()
        .all(|s| s.is_real_store && s.gateway_count >= 1));
    assert_eq!(summary.queries, vec!["seeded".to_string()]);
    assert!(!summary.finished_at.is_empty());
}

#[tokio::test]
async fn test_discovery_respects_the_result_budget() {
    let mock_server = MockServer::start().await;
    let urls = mount_store_fixtures(&mock_server).await;
    let orchestrator = orchestrator_for(urls);

    let request = DiscoveryRequest {
        queries: vec!["seeded".to_string()],
        pages: 1,
        max_results: 2,
        ..Default::default()
    };
    let summary = orchestrator.discover(&request).await;

    assert_eq!(summary.stores_found, 2);
    assert_eq!(summary.max_results, 2);
}

#[tokio::test]
async fn test_discovery_applies_filters_and_sort() {
    let mock_server = MockServer::start().await;
    let urls = mount_store_fixtures(&mock_server).await;
    let orchestrator = orchestrator_for(urls);

    let request = DiscoveryRequest {
        queries: vec!["seeded".to_string()],
        pages: 1,
        max_results: 10,
        filters: DiscoveryFilters {
            min_gateways: Some(2),
            ..Default::default()
        },
        sort_by: Some(SortBy::Gateways),
        ..Default::default()
    };
    let summary = orchestrator.discover(&request).await;

    assert_eq!(summary.stores_found, 2);
    let counts: Vec<usize> = summary.stores.iter().map(|s| s.gateway_count).collect();
    assert!(counts[0] >= counts[1], "gateway sort must be descending");
    assert!(summary.stores.iter().all(|s| s.gateway_count >= 2));
}

#[tokio::test]
async fn test_discover_rejects_invalid_target_price() {
    let config = storeprobe::Config::default();

    let request = DiscoveryRequest {
        filters: DiscoveryFilters {
            target_price: Some(f64::NAN),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = storeprobe::discover(&config, &request)
        .await
        .expect_err("a NaN target price is a caller error");
    assert!(err.to_string().contains("target_price"));

    let request = DiscoveryRequest {
        filters: DiscoveryFilters {
            target_price: Some(-5.0),
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(storeprobe::discover(&config, &request).await.is_err());
}
