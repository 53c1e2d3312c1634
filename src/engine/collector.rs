//! Single consumer of probe results
//!
//! Drains a result stream in arrival order, persisting and reporting every
//! result. Sink and reporter failures are counted and surfaced through the
//! observer, never allowed to end the collection early.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::observer::{RunEvent, SharedObserver};
use crate::reporter::Reporter;
use crate::storage::ResultSink;
use crate::{ProbeOutcome, ProbeResult};

/// Tally of a finished collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub total: usize,
    pub success: usize,
    pub network_error: usize,
    pub non_ok_status: usize,
    pub request_build_error: usize,

    /// Results the sink failed to persist
    pub sink_failures: usize,

    /// Results the reporter failed to print
    pub report_failures: usize,
}

impl CollectionSummary {
    fn record(&mut self, outcome: ProbeOutcome) {
        self.total += 1;
        match outcome {
            ProbeOutcome::Success => self.success += 1,
            ProbeOutcome::NetworkError => self.network_error += 1,
            ProbeOutcome::NonOkStatus => self.non_ok_status += 1,
            ProbeOutcome::RequestBuildError => self.request_build_error += 1,
        }
    }
}

pub struct Collector {
    sink: Arc<dyn ResultSink>,

    reporter: Arc<dyn Reporter>,

    observer: SharedObserver,
}

impl Collector {
    pub fn new(
        sink: Arc<dyn ResultSink>,
        reporter: Arc<dyn Reporter>,
        observer: SharedObserver,
    ) -> Self {
        Self {
            sink,
            reporter,
            observer,
        }
    }

    /// Consume `results` until the stream ends
    #[instrument(skip_all)]
    pub async fn collect<S>(&self, mut results: S) -> CollectionSummary
    where
        S: Stream<Item = ProbeResult> + Unpin,
    {
        let mut summary = CollectionSummary::default();

        while let Some(result) = results.next().await {
            trace!(url = %result.url, "collected result");
            summary.record(result.outcome);

            if let Err(e) = self.sink.append(&result).await {
                summary.sink_failures += 1;
                self.observer.on_event(&RunEvent::SinkWriteFailed {
                    url: result.url.clone(),
                    error: e.to_string(),
                });
            }

            if let Err(e) = self.reporter.report(&result).await {
                summary.report_failures += 1;
                self.observer.on_event(&RunEvent::ReportFailed {
                    url: result.url.clone(),
                    error: e.to_string(),
                });
            }
        }

        summary
    }
}
