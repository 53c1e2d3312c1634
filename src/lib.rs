pub mod config;
pub mod engine;
pub mod observer;
pub mod reporter;
pub mod runner;
pub mod storage;
pub mod targets;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single URL to probe
///
/// Targets are read once at startup and never change afterwards. An empty
/// target is still a target: it fails when the request is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn url(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Target {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Response received with status 200
    Success,

    /// Transport failed (timeout, refused, DNS, ...) and no response exists
    NetworkError,

    /// Response received, but the status was not 200
    NonOkStatus,

    /// The request could not be constructed from the target
    RequestBuildError,
}

impl ProbeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NetworkError => "network error",
            Self::NonOkStatus => "non-ok status",
            Self::RequestBuildError => "request build error",
        }
    }

    /// Whether a response object was obtained for this probe
    pub fn has_response(&self) -> bool {
        matches!(self, Self::Success | Self::NonOkStatus)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of probing one target
///
/// Exactly one of these is produced per target, whatever happens on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The probed URL, exactly as read from the target list
    pub url: String,

    /// HTTP status code, 0 when no response was obtained
    pub status_code: u16,

    /// Elapsed wall-clock time of the request in whole milliseconds
    pub duration_ms: u64,

    pub outcome: ProbeOutcome,

    /// Transport or build error text, if any
    pub error: Option<String>,

    /// When the probe finished
    pub checked_at: DateTime<Utc>,
}

impl ProbeResult {
    pub fn success(url: impl Into<String>, duration_ms: u64) -> Self {
        Self::responded(url, 200, duration_ms)
    }

    /// A probe that obtained a response; classified by its status code
    pub fn responded(url: impl Into<String>, status_code: u16, duration_ms: u64) -> Self {
        let outcome = if status_code == 200 {
            ProbeOutcome::Success
        } else {
            ProbeOutcome::NonOkStatus
        };

        Self {
            url: url.into(),
            status_code,
            duration_ms,
            outcome,
            error: None,
            checked_at: Utc::now(),
        }
    }

    pub fn network_error(
        url: impl Into<String>,
        duration_ms: u64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            status_code: 0,
            duration_ms,
            outcome: ProbeOutcome::NetworkError,
            error: Some(error.into()),
            checked_at: Utc::now(),
        }
    }

    /// No request was issued, so neither a status nor a duration exists
    pub fn request_build_error(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code: 0,
            duration_ms: 0,
            outcome: ProbeOutcome::RequestBuildError,
            error: Some(error.into()),
            checked_at: Utc::now(),
        }
    }
}
