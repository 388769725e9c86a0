//! log-vision
//!
//! An HTTP service for looking at the head or tail of log files on a host,
//! optionally filtered with regular expressions.
//!
//! # Overview
//!
//! A single `GET /` endpoint returns up to `limit` lines of a file, taken
//! from the start (`readFrom=head`) or the end (`readFrom=tail`, the default).
//! Files are named directly with `path` or through an `alias` configured at
//! startup. `filterBy` keeps only lines matching a regex and `ignore` drops
//! lines matching one; the limit counts lines after filtering.
//!
//! Tail reads walk the file backward in fixed-size chunks and stop as soon
//! as enough matching lines are found, so looking at the last few lines of a
//! multi-gigabyte log costs a few kilobytes of I/O.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use log_vision::{ReadDirection, ReadRequest, ResourceReader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = ResourceReader::default();
//! let request = ReadRequest::new("/var/log/syslog", ReadDirection::Tail, 20)
//!     .with_include("error")
//!     .with_exclude("debug");
//!
//! for line in reader.read(&request)?.lines {
//!     println!("{}", line);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`ResourceReader`]: head/tail line selection with filtering
//! - [`LineFilter`]: compiled include/exclude patterns
//! - [`AliasResolver`]: alias name to path lookup
//! - [`ViewQuery`]: query string parsing and validation
//! - [`VisionServer`]: hyper HTTP server wiring everything together
//! - [`VisionMetrics`]: Prometheus metrics
//!
//! # Configuration
//!
//! ```yaml
//! port: 8080
//! aliases:
//!   - name: syslog
//!     target: /var/log/syslog
//! chunk_size: 65536        # tail read chunk size
//! max_limit: 10000         # optional cap on limit
//! read_timeout_secs: 30
//! ```
//!
//! See [`VisionConfig`] for all options.
//!
//! # Error Handling
//!
//! All fallible operations return [`VisionError`], which maps onto an HTTP
//! status with [`VisionError::to_http_status`]:
//!
//! ```rust,no_run
//! use log_vision::{ReadDirection, ReadRequest, ResourceReader, VisionError};
//!
//! # fn main() {
//! let request = ReadRequest::new("/var/log/missing.log", ReadDirection::Head, 10);
//! match ResourceReader::default().read(&request) {
//!     Ok(result) => println!("{}", result.to_body()),
//!     Err(VisionError::ResourceNotFound(msg)) => eprintln!("not found: {}", msg),
//!     Err(e) => eprintln!("HTTP {}: {}", e.to_http_status(), e),
//! }
//! # }
//! ```

pub mod alias;
pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod models;
pub mod query;
pub mod reader;
pub mod server;

// Re-export commonly used types
pub use alias::AliasResolver;
pub use config::{AliasConfig, VisionConfig};
pub use error::{FilterKind, Result, VisionError};
pub use filter::LineFilter;
pub use metrics::VisionMetrics;
pub use models::{ReadDirection, ReadRequest, ReadResult};
pub use query::ViewQuery;
pub use reader::ResourceReader;
pub use server::{AppState, VisionServer};
