//! HTTP server
//!
//! Routes:
//! - `GET /` - view lines of a resource (see [`ViewQuery`])
//! - `GET /aliases` - list configured aliases
//! - `GET /health` - liveness check
//! - `GET /metrics` - Prometheus metrics
//!
//! Reads run on the blocking thread pool with a per-request timeout. When
//! the timeout fires the read is cancelled at its next chunk or line boundary.

use crate::alias::AliasResolver;
use crate::config::VisionConfig;
use crate::error::{Result, VisionError};
use crate::metrics::VisionMetrics;
use crate::models::ReadResult;
use crate::query::ViewQuery;
use crate::reader::ResourceReader;
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode, Uri};
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Everything a request handler needs, built once at startup
pub struct AppState {
    config: Arc<VisionConfig>,
    aliases: AliasResolver,
    reader: ResourceReader,
    metrics: VisionMetrics,
    read_timeout: Duration,
}

impl AppState {
    /// Build handler state from a validated configuration
    pub fn new(config: VisionConfig) -> Result<Self> {
        let metrics = VisionMetrics::new().map_err(|e| {
            VisionError::ConfigError(format!("Failed to register metrics: {}", e))
        })?;

        Ok(AppState {
            aliases: AliasResolver::new(&config.aliases),
            reader: ResourceReader::new(config.chunk_size),
            read_timeout: Duration::from_secs(config.read_timeout_secs),
            config: Arc::new(config),
            metrics,
        })
    }

    /// Override the per-read timeout taken from `read_timeout_secs`
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }
}

/// Raises the cancel flag of a blocking read when dropped
///
/// Held by the request future, so the read also stops when hyper drops the
/// handler because the client went away.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        // No-op for a read that already finished.
        self.0.store(true, Ordering::Relaxed);
    }
}

/// HTTP server for viewing log resources
pub struct VisionServer {
    state: Arc<AppState>,
    addr: SocketAddr,
}

impl VisionServer {
    /// Create a server that will listen on `addr`
    pub fn new(state: Arc<AppState>, addr: SocketAddr) -> Self {
        Self { state, addr }
    }

    /// Bind and serve until the process is terminated
    pub async fn start(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        info!("log-vision listening on http://{}", self.addr);
        info!("{} aliases configured", self.state.aliases.len());
        info!(
            "Tail chunk size {} bytes, read timeout {:?}",
            self.state.config().chunk_size,
            self.state.read_timeout
        );

        serve(listener, self.state).await
    }
}

/// Accept connections on an already bound listener
///
/// Each connection is served on its own task.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = Arc::clone(&state);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { handle_request(state, req).await }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!("Error serving connection from {}: {:?}", peer_addr, err);
            }
        });
    }
}

/// Route a request
///
/// Generic over the body type since no route reads the request body.
pub async fn handle_request<B>(
    state: Arc<AppState>,
    req: Request<B>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let uri = req.uri().clone();

    let (endpoint, response) = if req.method() != Method::GET {
        (
            "other",
            text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string()),
        )
    } else {
        match uri.path() {
            "/" => ("/", view_response(&state, &uri).await),
            "/aliases" => (
                "/aliases",
                text_response(StatusCode::OK, state.aliases.listing()),
            ),
            "/health" => ("/health", health_response()),
            "/metrics" => ("/metrics", metrics_response(&state.metrics)),
            _ => (
                "other",
                text_response(StatusCode::NOT_FOUND, "404 Not Found".to_string()),
            ),
        }
    };

    state
        .metrics
        .record_request(endpoint, response.status().as_u16());
    info!(
        "{} {} -> {} in {:?}",
        req.method(),
        uri,
        response.status().as_u16(),
        started.elapsed()
    );

    Ok(response)
}

async fn view_response(state: &AppState, uri: &Uri) -> Response<Full<Bytes>> {
    match view(state, uri).await {
        Ok(result) => text_response(StatusCode::OK, result.to_body()),
        Err(e) => {
            if e.is_client_error() {
                warn!("Rejected {}: {}", uri, e);
            } else {
                error!("Read failed for {}: {}", uri, e);
            }
            error_response(&e)
        }
    }
}

/// Parse, resolve and run a read on the blocking pool
async fn view(state: &AppState, uri: &Uri) -> Result<ReadResult> {
    let query = ViewQuery::parse(uri.query());
    let request = query.to_read_request(&state.aliases, state.config.max_limit)?;
    let direction = request.direction;

    let reader = state.reader.clone();
    let metrics = state.metrics.clone();
    let cancel = CancelOnDrop(Arc::new(AtomicBool::new(false)));
    let task_cancel = Arc::clone(&cancel.0);
    let started = Instant::now();

    let task = tokio::task::spawn_blocking(move || {
        metrics.reads_in_flight.inc();
        let result = reader.read_with_cancel(&request, &task_cancel);
        if let Err(VisionError::Cancelled(path)) = &result {
            metrics.reads_cancelled_total.inc();
            debug!("Read of {} stopped after cancellation", path);
        }
        metrics.reads_in_flight.dec();
        result
    });

    let result = match tokio::time::timeout(state.read_timeout, task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_err)) => {
            return Err(VisionError::IoError(format!("read task failed: {}", join_err)));
        }
        Err(_) => {
            cancel.0.store(true, Ordering::Relaxed);
            return Err(VisionError::ReadTimeout(state.read_timeout));
        }
    };

    state.metrics.record_read(direction, &result, started.elapsed());
    Ok(result)
}

fn text_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
    response
}

/// Plain-text error message with the status for its kind
fn error_response(err: &VisionError) -> Response<Full<Bytes>> {
    let status =
        StatusCode::from_u16(err.to_http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    text_response(status, err.to_string())
}

fn health_response() -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "status": "healthy" }).to_string();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn metrics_response(metrics: &VisionMetrics) -> Response<Full<Bytes>> {
    match metrics.render() {
        Ok(body) => {
            let mut response = Response::new(Full::new(Bytes::from(body)));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(prometheus::TEXT_FORMAT));
            response
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
