//! In-memory sink (no persistence)
//!
//! Useful for dry runs and tests. All records are lost when the process exits.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::trace;

use super::backend::ResultSink;
use super::error::{SinkError, SinkResult};
use super::schema::SinkRecord;
use crate::ProbeResult;

#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<SinkRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records appended so far, in append order
    pub fn records(&self) -> Vec<SinkRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn append(&self, result: &ProbeResult) -> SinkResult<()> {
        trace!("in-memory sink: appending record for {}", result.url);
        let mut records = self
            .records
            .lock()
            .map_err(|_| SinkError::WriteFailed(std::io::Error::other("memory sink poisoned")))?;
        records.push(SinkRecord::from(result));
        Ok(())
    }
}
