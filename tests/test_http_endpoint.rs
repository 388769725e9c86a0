// End-to-end tests against a real listener

use log_vision::config::{AliasConfig, VisionConfig};
use log_vision::server::{self, AppState};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::net::TcpListener;

struct TestServer {
    addr: SocketAddr,
    _log: NamedTempFile,
}

impl TestServer {
    fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

fn log_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for i in 1..=100 {
        let level = if i % 10 == 0 { "ERROR" } else { "INFO" };
        writeln!(file, "{} line {}", level, i).unwrap();
    }
    file.flush().unwrap();
    file
}

async fn start_server() -> TestServer {
    let log = log_file();

    let mut config = VisionConfig::default();
    config.chunk_size = 512;
    config.max_limit = Some(1000);
    config.aliases = vec![
        AliasConfig::new("app", log.path().to_string_lossy()),
        AliasConfig::new("gone", "/nonexistent/vision/gone.log"),
    ];

    let state = Arc::new(AppState::new(config).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(server::serve(listener, state));

    TestServer { addr, _log: log }
}

async fn get(url: String) -> (u16, String, String) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    (status, content_type, response.text().await.unwrap())
}

#[tokio::test]
async fn test_tail_by_alias_defaults() {
    let server = start_server().await;

    let (status, content_type, body) = get(server.url("/?alias=app")).await;
    assert_eq!(status, 200);
    assert_eq!(content_type, "text/plain; charset=utf-8");

    let lines: Vec<&str> = body.split('\n').collect();
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0], "INFO line 91");
    assert_eq!(lines[9], "ERROR line 100");
}

#[tokio::test]
async fn test_head_with_filters_by_path() {
    let server = start_server().await;
    let path = server._log.path().to_string_lossy().to_string();

    let url = server.url(&format!(
        "/?path={}&readFrom=head&limit=3&filterBy=%5EERROR&ignore=line%2020",
        path
    ));
    let (status, _, body) = get(url).await;
    assert_eq!(status, 200);
    assert_eq!(body, "ERROR line 10\nERROR line 30\nERROR line 40");
}

#[tokio::test]
async fn test_alias_wins_over_path() {
    let server = start_server().await;

    let (status, _, body) =
        get(server.url("/?alias=app&path=/nonexistent/other.log&limit=1")).await;
    assert_eq!(status, 200);
    assert_eq!(body, "ERROR line 100");
}

#[tokio::test]
async fn test_limit_zero_is_empty() {
    let server = start_server().await;

    let (status, _, body) = get(server.url("/?alias=app&limit=0")).await;
    assert_eq!(status, 200);
    assert_eq!(body, "");
}

#[tokio::test]
async fn test_error_statuses() {
    let server = start_server().await;

    let cases = [
        ("/?alias=app&limit=abc", 400),
        ("/?alias=app&limit=-1", 400),
        ("/?alias=app&limit=5000", 400),
        ("/?alias=app&readFrom=middle", 400),
        ("/?alias=app&filterBy=%28", 400),
        ("/?alias=app&ignore=%5B", 400),
        ("/", 400),
        ("/?alias=unknown", 404),
        ("/?alias=gone", 404),
        ("/?path=/nonexistent/vision/x.log", 404),
        ("/does-not-exist", 404),
    ];

    for (path, expected) in cases {
        let (status, content_type, body) = get(server.url(path)).await;
        assert_eq!(status, expected, "unexpected status for {}: {}", path, body);
        assert!(content_type.starts_with("text/plain"));
        assert!(!body.is_empty(), "error body should carry a message for {}", path);
    }
}

#[tokio::test]
async fn test_filter_error_names_parameter() {
    let server = start_server().await;

    let (_, _, body) = get(server.url("/?alias=app&ignore=%28")).await;
    assert!(body.contains("ignore"), "{}", body);
}

#[tokio::test]
async fn test_aliases_listing() {
    let server = start_server().await;

    let (status, _, body) = get(server.url("/aliases")).await;
    assert_eq!(status, 200);

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("app : "));
    assert_eq!(lines[1], "gone : /nonexistent/vision/gone.log");
}

#[tokio::test]
async fn test_metrics_after_read() {
    let server = start_server().await;

    get(server.url("/?alias=app&limit=5")).await;
    let (status, _, body) = get(server.url("/metrics")).await;
    assert_eq!(status, 200);
    assert!(body.contains("log_vision_lines_returned_total{direction=\"tail\"} 5"));
    assert!(body.contains("log_vision_requests_total{endpoint=\"/\",status=\"200\"} 1"));
}
