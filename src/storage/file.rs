//! Append-only JSON file sink
//!
//! Each record is written as a self-delimited JSON value followed by a
//! newline. The file is opened in append+create mode for every record, so
//! history from earlier runs is never truncated and a failed open only costs
//! that one record.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::trace;

use super::backend::ResultSink;
use super::error::{SinkError, SinkResult};
use super::schema::SinkRecord;
use crate::ProbeResult;
use crate::config::SinkFormat;

pub struct JsonFileSink {
    path: PathBuf,
    format: SinkFormat,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>, format: SinkFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(&self, record: &SinkRecord) -> SinkResult<Vec<u8>> {
        let mut buf = match self.format {
            SinkFormat::Lines => serde_json::to_vec(record)?,
            SinkFormat::Pretty => {
                let mut buf = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
                record.serialize(&mut serializer)?;
                buf
            }
        };
        buf.push(b'\n');
        Ok(buf)
    }
}

#[async_trait]
impl ResultSink for JsonFileSink {
    async fn append(&self, result: &ProbeResult) -> SinkResult<()> {
        let bytes = self.encode(&SinkRecord::from(result))?;

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await
            .map_err(|source| SinkError::OpenFailed {
                path: self.path.clone(),
                source,
            })?;

        file.write_all(&bytes).await.map_err(SinkError::WriteFailed)?;
        file.flush().await.map_err(SinkError::WriteFailed)?;

        trace!(path = %self.path.display(), "appended record for {}", result.url);
        Ok(())
    }
}

/// Read every record from a sink file, in the order they were appended
///
/// Accepts both the compact and the indented layout, including files that
/// mix the two.
pub async fn read_records(path: impl AsRef<Path>) -> SinkResult<Vec<SinkRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(SinkError::ReadFailed)?;

    serde_json::Deserializer::from_str(&content)
        .into_iter::<SinkRecord>()
        .map(|record| record.map_err(SinkError::from))
        .collect()
}
