//! Integration tests for the source collectors using wiremock HTTP mocks.

use std::path::PathBuf;

use brandlens_collect::discussions::{DiscussionsClient, DiscussionsCollector};
use brandlens_collect::microblog::{MicroblogClient, MicroblogCollector};
use brandlens_collect::ratings::{RatingsClient, RatingsCollector};
use brandlens_collect::website::WebsiteTrustCollector;
use brandlens_collect::SourceCollector;
use brandlens_core::{
    AccountPool, AppConfig, BrandQuery, MicroblogAccount, SourceId, SourceStatus,
};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> AppConfig {
    AppConfig {
        search_api_key: "search-key".to_string(),
        llm_api_key: "llm-key".to_string(),
        llm_model: "gemini-2.5-pro".to_string(),
        discussion_client_id: None,
        discussion_client_secret: None,
        discussion_user_agent: "brandlens-test/0.1".to_string(),
        microblog_accounts_path: None,
        crawl_api_key: None,
        http_timeout_secs: 5,
        collector_timeout_secs: 10,
        max_retries: 0,
        retry_backoff_base_ms: 0,
        user_agent: "brandlens-test/0.1".to_string(),
        out_dir: PathBuf::from("."),
    }
}

fn brand_query(brand: &str) -> BrandQuery {
    BrandQuery::new(brand, None, None).expect("valid query")
}

fn account_pool() -> AccountPool {
    AccountPool::new(vec![MicroblogAccount {
        label: "primary".to_string(),
        bearer_token: "tok-1".to_string(),
    }])
    .expect("non-empty pool")
}

#[tokio::test]
async fn ratings_collector_aggregates_products_and_reviews() {
    let server = MockServer::start().await;

    let shopping = serde_json::json!({
        "shopping_results": [
            {
                "title": "Acme Kettle 1.5L",
                "product_id": "p1",
                "rating": 4.6,
                "reviews": 320,
                "source": "Acme Store"
            },
            {
                "title": "Unrelated Blender",
                "product_id": "p2",
                "rating": 4.9,
                "reviews": 900,
                "source": {"name": "Other Shop"}
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_shopping"))
        .and(query_param("q", "Acme"))
        .and(query_param("api_key", "search-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&shopping))
        .mount(&server)
        .await;

    let product = serde_json::json!({
        "product_results": { "rating": 4.5, "reviews": 300 },
        "reviews_results": {
            "reviews": [
                { "content": "Boils fast and the handle stays cool", "link": "https://shop/r1" },
                { "snippet": "Lid came loose after a month of daily use" }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_product"))
        .and(query_param("product_id", "p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&product))
        .mount(&server)
        .await;

    let config = test_config();
    let client = RatingsClient::with_base_url(&config, &server.uri()).unwrap();
    let collector = RatingsCollector::with_client(client);

    let result = collector.collect(&brand_query("Acme")).await;

    assert_eq!(result.status, SourceStatus::Ok);
    assert_eq!(result.source, SourceId::Ratings);
    assert_eq!(result.findings.len(), 2);
    assert!(result.findings[0].text.contains("Boils fast"));
    assert_eq!(result.signals.average_rating, Some(4.5));
    assert_eq!(result.signals.review_count, Some(300));
    assert!(result.error.is_none());
}

#[tokio::test]
async fn ratings_collector_downgrades_auth_failure_to_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = test_config();
    let client = RatingsClient::with_base_url(&config, &server.uri()).unwrap();
    let collector = RatingsCollector::with_client(client);

    let result = collector.collect(&brand_query("Acme")).await;

    assert_eq!(result.status, SourceStatus::Failed);
    assert!(
        result
            .error
            .as_deref()
            .unwrap_or_default()
            .contains("authentication failed"),
        "auth failure should be captured in the error message, got {:?}",
        result.error
    );
}

#[tokio::test]
async fn ratings_collector_fails_when_nothing_matches_brand() {
    let server = MockServer::start().await;

    let shopping = serde_json::json!({
        "shopping_results": [
            { "title": "Generic Gadget", "product_id": "p9", "rating": 4.0, "reviews": 5 }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&shopping))
        .mount(&server)
        .await;

    let config = test_config();
    let client = RatingsClient::with_base_url(&config, &server.uri()).unwrap();
    let collector = RatingsCollector::with_client(client);

    let result = collector.collect(&brand_query("Acme")).await;
    assert_eq!(result.status, SourceStatus::Failed);
    assert!(result.error.as_deref().unwrap_or_default().contains("no products matched"));
}

#[tokio::test]
async fn discussions_collector_searches_with_exchanged_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "access_token": "tok-abc" })),
        )
        .mount(&server)
        .await;

    let listing = serde_json::json!({
        "data": {
            "children": [
                {
                    "data": {
                        "title": "Acme kettle long-term review",
                        "selftext": "Two years in and still going strong",
                        "permalink": "/r/BuyItForLife/comments/x1"
                    }
                },
                {
                    "data": {
                        "title": "Completely unrelated thread",
                        "selftext": "nothing to see",
                        "permalink": "/r/misc/comments/x2"
                    }
                }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&listing))
        .mount(&server)
        .await;

    let config = test_config();
    let client =
        DiscussionsClient::with_base_urls(&config, "cid", "csecret", &server.uri(), &server.uri())
            .unwrap();
    let collector = DiscussionsCollector::with_client(client);

    let result = collector.collect(&brand_query("Acme")).await;

    assert_eq!(result.status, SourceStatus::Ok);
    assert_eq!(result.findings.len(), 1, "non-mentions should be filtered out");
    assert!(result.findings[0].text.contains("long-term review"));
    assert_eq!(result.signals.mention_count, Some(1));
}

#[tokio::test]
async fn discussions_collector_fails_on_rejected_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = test_config();
    let client =
        DiscussionsClient::with_base_urls(&config, "cid", "bad", &server.uri(), &server.uri())
            .unwrap();
    let collector = DiscussionsCollector::with_client(client);

    let result = collector.collect(&brand_query("Acme")).await;
    assert_eq!(result.status, SourceStatus::Failed);
    assert!(result.error.as_deref().unwrap_or_default().contains("authentication failed"));
}

#[tokio::test]
async fn discussions_collector_skips_without_credentials() {
    let config = test_config();
    let collector = DiscussionsCollector::new(&config).unwrap();

    let result = collector.collect(&brand_query("Acme")).await;
    assert_eq!(result.status, SourceStatus::Skipped);
    assert!(result.error.as_deref().unwrap_or_default().contains("not configured"));
}

#[tokio::test]
async fn microblog_collector_returns_mentions_and_followers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(query_param("query", "@acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                { "id": "t1", "text": "@acme support sorted my order in a day" },
                { "id": "t2", "text": "the @acme kettle is my favorite purchase this year" }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2/users/by/username/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "public_metrics": { "followers_count": 12800 } }
        })))
        .mount(&server)
        .await;

    let config = test_config();
    let client = MicroblogClient::with_base_url(&config, account_pool(), &server.uri()).unwrap();
    let collector = MicroblogCollector::new(Some(client));

    let query = BrandQuery::new("Acme", Some("@acme".to_string()), None).unwrap();
    let result = collector.collect(&query).await;

    assert_eq!(result.status, SourceStatus::Ok);
    assert_eq!(result.findings.len(), 2);
    assert_eq!(result.signals.mention_count, Some(2));
    assert_eq!(result.signals.follower_count, Some(12_800));
}

#[tokio::test]
async fn microblog_collector_degrades_to_partial_when_profile_lookup_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [ { "id": "t1", "text": "@acme shipped fast" } ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2/users/by/username/acme"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = test_config();
    let client = MicroblogClient::with_base_url(&config, account_pool(), &server.uri()).unwrap();
    let collector = MicroblogCollector::new(Some(client));

    let query = BrandQuery::new("Acme", Some("acme".to_string()), None).unwrap();
    let result = collector.collect(&query).await;

    assert_eq!(result.status, SourceStatus::Partial);
    assert_eq!(result.findings.len(), 1);
    assert!(result.error.as_deref().unwrap_or_default().contains("profile lookup failed"));
}

#[tokio::test]
async fn website_collector_analyzes_plain_http_site() {
    let server = MockServer::start().await;

    let filler = "Our products are built to last and loved by customers. ".repeat(20);
    let page = format!(
        "<html><body><h1>Acme</h1><p>About us: founded in 2012, our story is one of quality.</p>\
         <p>Contact us at support@acme.example or +1 555-123-4567.</p>\
         <p>Registered office: 42 Industrial Estate, Phase II, Springfield 55501</p>\
         <p>Read our privacy policy and terms of service.</p>\
         <p>Follow https://instagram.com/acme</p><p>{filler}</p></body></html>"
    );

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let config = test_config();
    let collector = WebsiteTrustCollector::new(&config).unwrap();

    let query = BrandQuery::new("Acme", None, Some(server.uri())).unwrap();
    let result = collector.collect(&query).await;

    assert_eq!(result.status, SourceStatus::Ok);
    // Mock server speaks plain HTTP, so no TLS credit.
    assert_eq!(result.signals.ssl_valid, Some(false));
    assert_eq!(result.signals.contact_channels, Some(3));
    assert_eq!(result.signals.sections_found, Some(5));
    // phone 15 + address 15 + email 5 + about 12 + privacy 8 + terms 5
    // + support 3 + social 2 + content bonus 2 or 5
    let points = result.signals.site_trust_points.expect("points present");
    assert!(points >= 67, "expected >= 67 trust points, got {points}");
    assert!(result.findings.iter().any(|f| f.text.contains("Content sample")));
}

#[tokio::test]
async fn website_collector_prefers_crawl_service_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>tiny</html>"))
        .mount(&server)
        .await;

    let markdown = format!(
        "# Acme\n\nAbout us: our story began in 2012.\n\nContact us at hello@acme.example\n\n{}",
        "Detailed product documentation follows. ".repeat(60)
    );
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(serde_json::json!({ "formats": ["markdown"] })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "markdown": markdown } })),
        )
        .mount(&server)
        .await;

    let mut config = test_config();
    config.crawl_api_key = Some("crawl-key".to_string());
    let collector = WebsiteTrustCollector::with_crawl_base_url(&config, &server.uri()).unwrap();

    let query = BrandQuery::new("Acme", None, Some(server.uri())).unwrap();
    let result = collector.collect(&query).await;

    assert_eq!(result.status, SourceStatus::Ok);
    assert_eq!(result.signals.contact_channels, Some(1));
    assert!(result.signals.content_length.unwrap_or(0) > 500);
}

#[tokio::test]
async fn website_collector_skips_without_url() {
    let config = test_config();
    let collector = WebsiteTrustCollector::new(&config).unwrap();

    let result = collector.collect(&brand_query("Acme")).await;
    assert_eq!(result.status, SourceStatus::Skipped);
    assert_eq!(result.error.as_deref(), Some("no website URL provided"));
}

#[tokio::test]
async fn website_collector_fails_when_unreachable() {
    let config = test_config();
    let collector = WebsiteTrustCollector::new(&config).unwrap();

    let query = BrandQuery::new("Acme", None, Some("http://127.0.0.1:1".to_string())).unwrap();
    let result = collector.collect(&query).await;

    assert_eq!(result.status, SourceStatus::Failed);
    assert!(result.error.as_deref().unwrap_or_default().contains("unreachable"));
}
