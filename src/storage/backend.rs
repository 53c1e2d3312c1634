//! Sink trait definition

use async_trait::async_trait;

use super::error::SinkResult;
use crate::ProbeResult;

/// Append-only destination for probe results
///
/// The collector is the only caller, so implementations see one append at a
/// time. They must still be `Send + Sync` because the collector runs on the
/// tokio runtime.
///
/// ## Error Handling
///
/// A failed append affects only that record. The caller logs it and moves on
/// to the next result, so implementations must not leave themselves in a
/// state where later appends fail because an earlier one did.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist one result
    async fn append(&self, result: &ProbeResult) -> SinkResult<()>;
}
