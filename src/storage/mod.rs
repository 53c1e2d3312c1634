//! Result sinks
//!
//! The collector hands every probe result to a [`ResultSink`]. The file sink
//! is the durable log; the memory sink exists for dry runs and tests.
//!
//! ## Usage
//!
//! ```no_run
//! use url_prober::ProbeResult;
//! use url_prober::config::SinkFormat;
//! use url_prober::storage::{JsonFileSink, ResultSink};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let sink = JsonFileSink::new("results.txt", SinkFormat::Lines);
//!     sink.append(&ProbeResult::success("https://example.com", 42)).await?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod file;
pub mod memory;
pub mod schema;

use std::sync::Arc;

pub use backend::ResultSink;
pub use error::{SinkError, SinkResult};
pub use file::{JsonFileSink, read_records};
pub use memory::MemorySink;
pub use schema::SinkRecord;

use crate::config::SinkConfig;

/// Build the sink described by `config`
pub fn create_sink(config: &SinkConfig) -> Arc<dyn ResultSink> {
    match config {
        SinkConfig::None => Arc::new(MemorySink::new()),
        SinkConfig::File { path, format } => Arc::new(JsonFileSink::new(path.clone(), *format)),
    }
}
