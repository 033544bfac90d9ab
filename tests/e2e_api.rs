// Web2Text Console - tests/e2e_api.rs
//
// End-to-end tests for the REST client against a real TCP backend.
//
// These tests run a minimal HTTP/1.1 responder on a real socket and
// drive the blocking client against it: real connections, real cookie
// jar, real JSON decoding. No mocks, no stubs. Each response closes the
// connection so the responder never has to speak keep-alive.

use chrono::Utc;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use web2text_console::api::ApiClient;
use web2text_console::core::model::{FeedQuery, SiteCreate};
use web2text_console::util::error::ApiError;

// =============================================================================
// Minimal HTTP responder
// =============================================================================

/// One parsed inbound request.
struct Request {
    method: String,
    /// Path including the query string, e.g. "/feed/new?page=1".
    target: String,
    headers: HashMap<String, String>,
    body: String,
}

type Router = dyn Fn(&Request) -> String + Send + Sync;

/// Backend stand-in: accepts connections on a background thread and
/// answers each request through the router closure.
struct TestServer {
    base_url: String,
}

impl TestServer {
    fn start(router: impl Fn(&Request) -> String + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        let router: Arc<Router> = Arc::new(router);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let router = Arc::clone(&router);
                std::thread::spawn(move || handle_connection(stream, &*router));
            }
        });

        Self {
            base_url: format!("http://{addr}"),
        }
    }

    fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url).expect("client for test server")
    }
}

fn handle_connection(mut stream: TcpStream, router: &Router) {
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let response = router(&request);
    let _ = stream.write_all(response.as_bytes());
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];

    // Read until the end of the header block.
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        raw.extend_from_slice(&buf[..n]);
        if let Some(pos) = find_header_end(&raw) {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_lowercase(), value.trim().to_string());
        }
    }

    // Read the body if the client declared one.
    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body_bytes = raw[header_end + 4..].to_vec();
    while body_bytes.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body_bytes.extend_from_slice(&buf[..n]);
    }

    Some(Request {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body_bytes).to_string(),
    })
}

fn find_header_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|w| w == b"\r\n\r\n")
}

fn json_response(status: u16, body: &str) -> String {
    response_with_headers(status, body, "")
}

fn response_with_headers(status: u16, body: &str, extra_headers: &str) -> String {
    let reason = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Unknown",
    };
    format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         {extra_headers}\r\n{body}",
        body.len()
    )
}

fn site_json(id: &str, name: &str, enabled: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "base_url": "https://news.example.com",
        "enabled": enabled,
        "sitemap_url": "https://news.example.com/sitemap.xml",
        "rss_url": null,
        "crawl_strategy": "sitemap",
        "created_at": "2026-02-01T08:00:00Z",
        "updated_at": "2026-02-01T08:00:00Z",
        "pages_count": 42,
        "pending_count": 3,
        "config_warning": null
    })
}

// =============================================================================
// Auth E2E
// =============================================================================

/// The session probe without a cookie is a clean Unauthorized, and the
/// cookie set by login is carried on the next request automatically.
#[test]
fn e2e_login_sets_cookie_used_by_session_probe() {
    let server = TestServer::start(|req| match (req.method.as_str(), req.target.as_str()) {
        ("POST", "/auth/login") => {
            // FastAPI's login route takes a URL-encoded form.
            assert_eq!(
                req.headers.get("content-type").map(String::as_str),
                Some("application/x-www-form-urlencoded")
            );
            assert!(req.body.contains("username=admin"));
            assert!(req.body.contains("password=hunter2"));
            response_with_headers(
                200,
                r#"{"message":"ok"}"#,
                "Set-Cookie: session=e2e-token; Path=/; HttpOnly\r\n",
            )
        }
        ("GET", "/auth/me") => {
            let has_cookie = req
                .headers
                .get("cookie")
                .is_some_and(|c| c.contains("session=e2e-token"));
            if has_cookie {
                json_response(200, r#"{"username":"admin"}"#)
            } else {
                json_response(401, r#"{"detail":"Not authenticated"}"#)
            }
        }
        _ => json_response(404, r#"{"detail":"Not found"}"#),
    });

    let client = server.client();

    // Before login the probe must signal Unauthorized, nothing else.
    let probe = client.me();
    assert!(matches!(probe, Err(ApiError::Unauthorized)), "{probe:?}");

    client.login("admin", "hunter2").expect("login");

    let user = client.me().expect("me after login");
    assert_eq!(user.username, "admin");
}

// =============================================================================
// Sites E2E
// =============================================================================

#[test]
fn e2e_site_listing_and_creation_round_trip() {
    let server = TestServer::start(|req| match (req.method.as_str(), req.target.as_str()) {
        ("GET", "/sites/") => {
            let body = serde_json::json!([site_json("s1", "Example News", true)]);
            json_response(200, &body.to_string())
        }
        ("POST", "/sites/") => {
            let sent: serde_json::Value = serde_json::from_str(&req.body).expect("create body");
            assert_eq!(sent["name"], "Example News");
            assert_eq!(sent["crawl_strategy"], "sitemap");
            json_response(201, &site_json("s2", "Example News", true).to_string())
        }
        _ => json_response(404, r#"{"detail":"Not found"}"#),
    });

    let client = server.client();

    let sites = client.list_sites().expect("list sites");
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].name, "Example News");
    assert_eq!(sites[0].pages_count, 42);
    assert_eq!(sites[0].pending_count, 3);

    let created = client
        .create_site(&SiteCreate {
            name: "Example News".to_string(),
            base_url: "https://news.example.com".to_string(),
            enabled: true,
            crawl_strategy: Default::default(),
        })
        .expect("create site");
    assert_eq!(created.id, "s2");
}

/// Backend validation failures surface the `detail` field, not raw JSON.
#[test]
fn e2e_error_detail_is_extracted_from_body() {
    let server = TestServer::start(|req| {
        assert_eq!(req.method, "POST");
        json_response(400, r#"{"detail":"Site with this base_url already exists"}"#)
    });

    let result = server.client().create_site(&SiteCreate::default());
    match result {
        Err(ApiError::Http { status, detail }) => {
            assert_eq!(status, 400);
            assert_eq!(detail, "Site with this base_url already exists");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

// =============================================================================
// Feed E2E
// =============================================================================

#[test]
fn e2e_feed_query_parameters_reach_the_wire() {
    let server = TestServer::start(|req| {
        assert_eq!(req.method, "GET");
        let (path, query) = req.target.split_once('?').expect("query string");
        assert_eq!(path, "/feed/new");
        assert!(query.contains("page=2"), "query was: {query}");
        assert!(query.contains("page_size=10"), "query was: {query}");
        assert!(query.contains("since="), "query was: {query}");
        assert!(query.contains("search=rust"), "query was: {query}");

        let body = serde_json::json!({
            "items": [{
                "id": "p1",
                "site_id": "s1",
                "url": "https://news.example.com/a",
                "canonical_url": "https://news.example.com/a",
                "title": "A headline",
                "published_at": "2026-02-02T09:00:00Z",
                "scraped_at": "2026-02-02T10:00:00Z",
                "status": "processed",
                "discovered_via": "sitemap",
                "site_name": "Example News",
                "latest_content": {
                    "id": "c1",
                    "extracted_text": "Body text.",
                    "created_at": "2026-02-02T10:00:00Z"
                }
            }],
            "total": 31,
            "page": 2,
            "page_size": 10,
            "total_pages": 4
        });
        json_response(200, &body.to_string())
    });

    let mut query = FeedQuery::recent(10);
    query.page = 2;
    query.search = "rust".to_string();
    query.since = Utc::now() - chrono::Duration::hours(6);

    let page = server.client().feed(&query).expect("feed");
    assert_eq!(page.total, 31);
    assert_eq!(page.total_pages, 4);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title.as_deref(), Some("A headline"));
    assert_eq!(
        page.items[0]
            .latest_content
            .as_ref()
            .map(|c| c.extracted_text.as_str()),
        Some("Body text.")
    );
}

// =============================================================================
// Settings and API keys E2E
// =============================================================================

#[test]
fn e2e_setting_save_sends_value_envelope() {
    let server = TestServer::start(|req| {
        match (req.method.as_str(), req.target.as_str()) {
            ("GET", "/settings/scrape_interval_minutes") => {
                json_response(200, r#"{"key":"scrape_interval_minutes","value":"30"}"#)
            }
            ("PUT", "/settings/scrape_interval_minutes") => {
                let sent: serde_json::Value = serde_json::from_str(&req.body).expect("put body");
                assert_eq!(sent, serde_json::json!({ "value": "15" }));
                json_response(200, r#"{"key":"scrape_interval_minutes","value":"15"}"#)
            }
            _ => json_response(404, r#"{"detail":"Setting not found"}"#),
        }
    });

    let client = server.client();

    let setting = client.setting("scrape_interval_minutes").expect("get");
    assert_eq!(setting.value, "30");

    let saved = client.save_setting("scrape_interval_minutes", "15").expect("put");
    assert_eq!(saved.value, "15");

    // Unknown keys are a plain 404 the caller can treat as unset.
    let missing = client.setting("does_not_exist");
    assert!(
        matches!(missing, Err(ApiError::Http { status: 404, .. })),
        "{missing:?}"
    );
}

#[test]
fn e2e_generated_key_carries_one_time_secret() {
    let server = TestServer::start(|req| match (req.method.as_str(), req.target.as_str()) {
        ("POST", "/api-keys") => {
            let sent: serde_json::Value = serde_json::from_str(&req.body).expect("body");
            assert_eq!(sent["name"], "ci-pipeline");
            json_response(
                201,
                r#"{
                    "id": "k1",
                    "name": "ci-pipeline",
                    "prefix": "Ab12Cd34",
                    "created_at": "2026-02-03T12:00:00Z",
                    "is_active": true,
                    "key": "Ab12Cd34.full-secret-value"
                }"#,
            )
        }
        ("DELETE", "/api-keys/k1") => json_response(200, r#"{"message":"revoked"}"#),
        _ => json_response(404, r#"{"detail":"Not found"}"#),
    });

    let client = server.client();

    let generated = client.generate_api_key("ci-pipeline").expect("generate");
    assert_eq!(generated.record.id, "k1");
    assert_eq!(generated.record.prefix, "Ab12Cd34");
    assert_eq!(generated.key, "Ab12Cd34.full-secret-value");

    client.revoke_api_key("k1").expect("revoke");
}
