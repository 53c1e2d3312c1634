//! Error types for sink operations

use std::fmt;
use std::path::PathBuf;

/// Result type alias for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Errors that can occur while persisting or reading back probe records
#[derive(Debug)]
pub enum SinkError {
    /// The sink file could not be opened (or created)
    OpenFailed { path: PathBuf, source: std::io::Error },

    /// Writing a record failed part-way
    WriteFailed(std::io::Error),

    /// Reading persisted records failed
    ReadFailed(std::io::Error),

    /// A record could not be encoded or decoded
    SerializationFailed(serde_json::Error),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::OpenFailed { path, source } => {
                write!(f, "failed to open sink file {}: {}", path.display(), source)
            }
            SinkError::WriteFailed(err) => write!(f, "failed to write record: {}", err),
            SinkError::ReadFailed(err) => write!(f, "failed to read records: {}", err),
            SinkError::SerializationFailed(err) => write!(f, "record serialization error: {}", err),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::OpenFailed { source, .. } => Some(source),
            SinkError::WriteFailed(err) | SinkError::ReadFailed(err) => Some(err),
            SinkError::SerializationFailed(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::SerializationFailed(err)
    }
}
