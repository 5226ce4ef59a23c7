//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the comment and profile
//! endpoints and run the fetcher and full sessions against it.

use serde_json::{json, Value};
use weibo_comment_crawler::comment::FetchLevel;
use weibo_comment_crawler::config::Config;
use weibo_comment_crawler::crawler::{
    EventEmitter, HttpFetcher, PageFetcher, PageRequest, SessionController,
};
use weibo_comment_crawler::output::{DirectorySink, BOM};
use weibo_comment_crawler::url::encode_id;
use weibo_comment_crawler::{CrawlerError, SessionState};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const AUTHOR_ID: &str = "1234567890";
const POST_ID: u64 = 5_012_345_678_901_234;
const COMMENTS_PATH: &str = "/ajax/statuses/buildComments";
const PROFILE_PATH: &str = "/ajax/profile/info";

/// Matches requests that do not carry the given query parameter
struct NoQueryParam(&'static str);

impl Match for NoQueryParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == self.0)
    }
}

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.client.base_url = base_url.to_string();
    config.client.cookie = Some("SUB=test-session".to_string());
    config.crawler.cooldown_secs = 0;
    config.crawler.retry_delay_ms = 0;
    config
}

fn post_url() -> String {
    format!("https://weibo.com/{}/{}?refer_flag=1001030103_", AUTHOR_ID, encode_id(POST_ID))
}

fn comment_json(id: u64, replies: u64, text: &str) -> Value {
    json!({
        "id": id,
        "idstr": id.to_string(),
        "created_at": "Tue Oct 15 12:34:56 +0800 2024",
        "text_raw": text,
        "like_counts": 7,
        "total_number": replies,
        "source": "来自北京",
        "user": {
            "id": 42,
            "screen_name": "commenter",
            "verified": true,
            "gender": "f",
            "followers_count": "1,024",
            "friends_count": 12,
            "svip": 3,
            "description": "bio",
            "status_total_counter": { "total_cnt": "1,234,567" },
            "fansIcon": { "icon_url": "https://h5.sinaimg.cn/upload/fans/2_5.png" }
        }
    })
}

fn reply_json(id: u64, root: u64, text: &str) -> Value {
    let mut reply = comment_json(id, 0, text);
    reply["rootidstr"] = json!(root.to_string());
    reply
}

async fn mount_author(server: &MockServer, screen_name: &str) {
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .and(query_param("custom", AUTHOR_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": 1,
            "data": { "user": { "id": 1234567890u64, "screen_name": screen_name } }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_first_page() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .and(query_param("flow", "1"))
        .and(query_param("is_reload", "1"))
        .and(query_param("id", POST_ID.to_string()))
        .and(query_param("is_show_bulletin", "2"))
        .and(query_param("is_mix", "0"))
        .and(query_param("count", "20"))
        .and(query_param("uid", AUTHOR_ID))
        .and(query_param("fetch_level", "0"))
        .and(query_param("locale", "zh-CN"))
        .and(NoQueryParam("max_id"))
        .and(header("referer", "https://weibo.com/"))
        .and(header("cookie", "SUB=test-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": 1,
            "data": [comment_json(1, 0, "first"), comment_json(2, 0, "second")],
            "max_id": 139_000_000_001u64
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&config.client, config.crawler.page_size)
        .expect("Failed to build fetcher");
    let page = fetcher
        .fetch_page(&PageRequest::first_page(AUTHOR_ID, POST_ID, FetchLevel::TopLevel))
        .await
        .expect("Fetch failed");

    assert_eq!(page.comments.len(), 2);
    assert_eq!(page.comments[1].text_raw, "second");
    assert_eq!(page.next_cursor(), Some(139_000_000_001));
}

#[tokio::test]
async fn test_fetch_reply_page_with_cursor() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .and(query_param("id", "77"))
        .and(query_param("fetch_level", "1"))
        .and(query_param("max_id", "4242"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [reply_json(78, 77, "reply")],
            "max_id": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&config.client, config.crawler.page_size)
        .expect("Failed to build fetcher");
    let mut request = PageRequest::first_page(AUTHOR_ID, 77, FetchLevel::Reply);
    request.cursor = Some(4242);

    let page = fetcher.fetch_page(&request).await.expect("Fetch failed");

    assert_eq!(page.comments.len(), 1);
    assert_eq!(page.comments[0].rootidstr.as_deref(), Some("77"));
    assert_eq!(page.next_cursor(), None);
}

#[tokio::test]
async fn test_non_success_status_is_page_fetch_error() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&config.client, 20).expect("Failed to build fetcher");
    let result = fetcher
        .fetch_page(&PageRequest::first_page(AUTHOR_ID, POST_ID, FetchLevel::TopLevel))
        .await;

    match result {
        Err(CrawlerError::PageFetch { message, .. }) => assert_eq!(message, "HTTP 503"),
        other => panic!("Expected PageFetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_json_is_page_fetch_error() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login required</html>"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&config.client, 20).expect("Failed to build fetcher");
    let result = fetcher
        .fetch_page(&PageRequest::first_page(AUTHOR_ID, POST_ID, FetchLevel::TopLevel))
        .await;

    assert!(matches!(result, Err(CrawlerError::PageFetch { .. })));
}

#[tokio::test]
async fn test_author_lookup() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    mount_author(&mock_server, "post author").await;

    let fetcher = HttpFetcher::new(&config.client, 20).expect("Failed to build fetcher");
    let name = fetcher
        .lookup_author_name(AUTHOR_ID)
        .await
        .expect("Lookup failed");

    assert_eq!(name, "post author");
}

#[tokio::test]
async fn test_author_lookup_without_screen_name() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": 0, "data": {} })))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&config.client, 20).expect("Failed to build fetcher");
    let result = fetcher.lookup_author_name(AUTHOR_ID).await;

    match result {
        Err(CrawlerError::AuthorLookup { author_id, .. }) => assert_eq!(author_id, AUTHOR_ID),
        other => panic!("Expected AuthorLookup error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_session_exports_csv() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    mount_author(&mock_server, "post/author").await;

    // Top-level page 1: comment 1 has one reply, comment 2 has none
    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .and(query_param("id", POST_ID.to_string()))
        .and(query_param("fetch_level", "0"))
        .and(NoQueryParam("max_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [comment_json(1, 1, "first, with \"quotes\""), comment_json(2, 0, "second")],
            "max_id": 555
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Top-level page 2
    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .and(query_param("id", POST_ID.to_string()))
        .and(query_param("max_id", "555"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [comment_json(3, 0, "third\nline")],
            "max_id": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Replies of comment 1
    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .and(query_param("id", "1"))
        .and(query_param("fetch_level", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [reply_json(11, 1, "reply")],
            "max_id": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut controller = SessionController::new(
        HttpFetcher::new(&config.client, config.crawler.page_size).expect("Failed to build fetcher"),
        &config,
        EventEmitter::disabled(),
    );

    let state = controller.start(&post_url()).await.expect("Session failed");
    assert_eq!(state, SessionState::Completed);
    assert_eq!(controller.author_name(), Some("post/author"));
    assert_eq!(controller.stats().pages_fetched, 3);
    assert_eq!(controller.stats().reply_records, 1);

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = controller
        .export_to(&DirectorySink::new(dir.path()))
        .expect("Export failed");

    let filename = path.file_name().and_then(|n| n.to_str()).expect("No file name");
    assert!(filename.starts_with("post_author_"), "unexpected name {}", filename);
    assert!(filename.ends_with(".csv"));

    let bytes = std::fs::read(&path).expect("Failed to read export");
    assert!(bytes.starts_with(BOM));

    let mut reader = csv::Reader::from_reader(&bytes[BOM.len()..]);
    let headers = reader.headers().expect("No header row").clone();
    assert_eq!(headers.len(), 18);
    assert_eq!(&headers[0], "sequence");

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("Invalid CSV");
    assert_eq!(rows.len(), 4);

    // Depth-first: the reply comes before the next sibling
    let order: Vec<(&str, &str, &str)> = rows.iter().map(|r| (&r[0], &r[1], &r[2])).collect();
    assert_eq!(
        order,
        vec![("1", "1", ""), ("2", "11", "1"), ("3", "2", ""), ("4", "3", "")]
    );

    let first = &rows[0];
    assert_eq!(&first[4], "2024-10-15 12:34:56");
    assert_eq!(&first[6], "female");
    assert_eq!(&first[7], "first, with \"quotes\"");
    assert_eq!(&first[10], "gold5");
    assert_eq!(&first[11], "北京");
    assert_eq!(&first[13], "yes");
    assert_eq!(&first[14], "3");
    assert_eq!(&first[15], "1024");
    assert_eq!(&first[17], "1234567");
    assert_eq!(&rows[3][7], "third\nline");
}

#[tokio::test]
async fn test_session_fails_when_author_lookup_fails() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [], "max_id": 0 })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (events, _receiver) = EventEmitter::channel();
    let mut controller = SessionController::new(
        HttpFetcher::new(&config.client, 20).expect("Failed to build fetcher"),
        &config,
        events,
    );

    let result = controller.start(&post_url()).await;

    assert!(matches!(result, Err(CrawlerError::AuthorLookup { .. })));
    assert_eq!(controller.state(), SessionState::Failed);
    assert!(controller.export().is_err());
}

#[tokio::test]
async fn test_failed_reply_page_keeps_siblings() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    mount_author(&mock_server, "author").await;

    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .and(query_param("fetch_level", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [comment_json(1, 3, "has replies"), comment_json(2, 0, "sibling")],
            "max_id": 0
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .and(query_param("fetch_level", "1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut controller = SessionController::new(
        HttpFetcher::new(&config.client, 20).expect("Failed to build fetcher"),
        &config,
        EventEmitter::disabled(),
    );

    let state = controller.start(&post_url()).await.expect("Session failed");

    assert_eq!(state, SessionState::Completed);
    let ids: Vec<&str> = controller
        .records()
        .iter()
        .map(|r| r.comment_id.as_str())
        .collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(controller.stats().failed_fetches, 1);
}
