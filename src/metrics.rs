//! Prometheus metrics for the log-vision service
//!
//! Metrics are registered against a registry owned by the collector rather
//! than the process-global default, so several servers (and tests) can run in
//! one process.

use crate::models::{ReadDirection, ReadResult};
use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntCounter, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Service metrics
#[derive(Clone)]
pub struct VisionMetrics {
    registry: Registry,

    /// Requests by endpoint and response status
    pub requests_total: CounterVec,

    /// Wall time of reads by direction
    pub read_duration_seconds: HistogramVec,

    /// Lines returned to callers by direction
    pub lines_returned_total: CounterVec,

    /// Bytes read from files by direction
    pub bytes_scanned_total: CounterVec,

    /// Reads currently running on the blocking pool
    pub reads_in_flight: IntGauge,

    /// Reads stopped early by a timeout or a dropped request
    pub reads_cancelled_total: IntCounter,
}

impl VisionMetrics {
    /// Create the collector and register every metric
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = CounterVec::new(
            Opts::new("log_vision_requests_total", "Total number of HTTP requests"),
            &["endpoint", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let read_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "log_vision_read_duration_seconds",
                "Duration of resource reads in seconds",
            )
            .buckets(vec![
                0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0,
            ]),
            &["direction"],
        )?;
        registry.register(Box::new(read_duration_seconds.clone()))?;

        let lines_returned_total = CounterVec::new(
            Opts::new(
                "log_vision_lines_returned_total",
                "Total number of lines returned to callers",
            ),
            &["direction"],
        )?;
        registry.register(Box::new(lines_returned_total.clone()))?;

        let bytes_scanned_total = CounterVec::new(
            Opts::new(
                "log_vision_bytes_scanned_total",
                "Total number of bytes read from resources",
            ),
            &["direction"],
        )?;
        registry.register(Box::new(bytes_scanned_total.clone()))?;

        let reads_in_flight = IntGauge::new(
            "log_vision_reads_in_flight",
            "Number of resource reads currently running",
        )?;
        registry.register(Box::new(reads_in_flight.clone()))?;

        let reads_cancelled_total = IntCounter::new(
            "log_vision_reads_cancelled_total",
            "Total number of reads stopped before completion",
        )?;
        registry.register(Box::new(reads_cancelled_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            read_duration_seconds,
            lines_returned_total,
            bytes_scanned_total,
            reads_in_flight,
            reads_cancelled_total,
        })
    }

    /// Record a finished HTTP request
    pub fn record_request(&self, endpoint: &str, status: u16) {
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[endpoint, status.as_str()])
            .inc();
    }

    /// Record a successful read
    pub fn record_read(&self, direction: ReadDirection, result: &ReadResult, elapsed: Duration) {
        let label = direction.as_str();
        self.read_duration_seconds
            .with_label_values(&[label])
            .observe(elapsed.as_secs_f64());
        self.lines_returned_total
            .with_label_values(&[label])
            .inc_by(result.len() as f64);
        self.bytes_scanned_total
            .with_label_values(&[label])
            .inc_by(result.bytes_scanned as f64);
    }

    /// Text exposition format of everything registered
    ///
    /// Served with `prometheus::TEXT_FORMAT` as the content type.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
