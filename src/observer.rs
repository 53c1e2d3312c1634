//! Run events and the observers that receive them
//!
//! Every component reports what happened through a [`RunObserver`] owned by
//! the run context instead of logging on its own. The default
//! [`TracingObserver`] turns events into `tracing` records; tests install a
//! [`RecordingObserver`] and assert on the events directly.

use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};

use crate::ProbeOutcome;
use crate::engine::collector::CollectionSummary;

/// Something notable that happened during a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// The target list was read
    TargetsLoaded { count: usize },

    /// The target list could not be read; the run continues with no targets
    SourceReadFailed { path: String, error: String },

    RequestBuildFailed { url: String, error: String },

    NetworkFailed { url: String, error: String },

    /// A response arrived with a status other than 200
    NonOkStatus { url: String, status: u16 },

    /// A prober finished and its result is on its way to the collector
    ProbeCompleted {
        url: String,
        outcome: ProbeOutcome,
        duration_ms: u64,
    },

    /// A result could not be delivered because the collector is gone
    ResultDropped { url: String },

    SinkWriteFailed { url: String, error: String },

    ReportFailed { url: String, error: String },

    /// Every prober finished and the result channel was closed
    ChannelClosed,

    RunFinished { summary: CollectionSummary },
}

/// Receiver of run events
pub trait RunObserver: Send + Sync {
    fn on_event(&self, event: &RunEvent);
}

pub type SharedObserver = Arc<dyn RunObserver>;

/// Forwards every event to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::TargetsLoaded { count } => info!("loaded {count} targets"),
            RunEvent::SourceReadFailed { path, error } => {
                error!("failed to read targets from {path}: {error}")
            }
            RunEvent::RequestBuildFailed { url, error } => {
                warn!(url = %url, "could not build request: {error}")
            }
            RunEvent::NetworkFailed { url, error } => {
                warn!(url = %url, "network error: {error}")
            }
            RunEvent::NonOkStatus { url, status } => {
                warn!(url = %url, "GET request failed with status {status}")
            }
            RunEvent::ProbeCompleted {
                url,
                outcome,
                duration_ms,
            } => debug!(url = %url, %outcome, duration_ms, "probe completed"),
            RunEvent::ResultDropped { url } => {
                error!(url = %url, "collector is gone, result dropped")
            }
            RunEvent::SinkWriteFailed { url, error } => {
                error!(url = %url, "failed to persist result: {error}")
            }
            RunEvent::ReportFailed { url, error } => {
                error!(url = %url, "failed to report result: {error}")
            }
            RunEvent::ChannelClosed => debug!("all probers finished, result channel closed"),
            RunEvent::RunFinished { summary } => info!(
                total = summary.total,
                success = summary.success,
                network_error = summary.network_error,
                non_ok_status = summary.non_ok_status,
                request_build_error = summary.request_build_error,
                "run finished"
            ),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far, in arrival order
    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn count_matching(&self, predicate: impl Fn(&RunEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

impl RunObserver for RecordingObserver {
    fn on_event(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
