//! Persisted record layout
//!
//! Only the fields below reach the sink; outcome, error text and timestamps
//! stay in memory. The key names are part of the file format and must not
//! change, since existing result files are appended to across runs.

use serde::{Deserialize, Serialize};

use crate::ProbeResult;

/// One persisted probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkRecord {
    pub url: String,

    /// HTTP status code, 0 when no response was obtained
    pub status_code: u16,

    /// Request duration in milliseconds
    #[serde(rename = "duration")]
    pub duration_ms: u64,
}

impl From<&ProbeResult> for SinkRecord {
    fn from(result: &ProbeResult) -> Self {
        Self {
            url: result.url.clone(),
            status_code: result.status_code,
            duration_ms: result.duration_ms,
        }
    }
}
