//! Run context
//!
//! [`ProbeRun`] owns everything a run needs (configuration, sink, reporter
//! and observer) and wires target loading, dispatch and collection together.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::Target;
use crate::config::ProbeConfig;
use crate::engine::{CollectionSummary, Collector, Dispatcher, Prober};
use crate::observer::{RunEvent, SharedObserver, TracingObserver};
use crate::reporter::{ConsoleReporter, Reporter};
use crate::storage::{ResultSink, create_sink};
use crate::targets::{TargetOptions, read_targets};

pub struct ProbeRun {
    config: ProbeConfig,
    sink: Arc<dyn ResultSink>,
    reporter: Arc<dyn Reporter>,
    observer: SharedObserver,
}

impl ProbeRun {
    /// Sink from the configuration, results on stdout, events to `tracing`
    pub fn new(config: ProbeConfig) -> Self {
        let sink = create_sink(&config.sink);

        Self {
            config,
            sink,
            reporter: Arc::new(ConsoleReporter::stdout()),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Read the configured target list and probe it
    ///
    /// An unreadable target list is reported and treated as empty.
    #[instrument(skip(self), fields(input = %self.config.input.display()))]
    pub async fn execute(&self) -> Result<CollectionSummary> {
        let options = TargetOptions {
            skip_blank_lines: self.config.skip_blank_lines,
        };

        let targets = match read_targets(&self.config.input, options).await {
            Ok(targets) => {
                self.observer.on_event(&RunEvent::TargetsLoaded {
                    count: targets.len(),
                });
                targets
            }
            Err(e) => {
                self.observer.on_event(&RunEvent::SourceReadFailed {
                    path: e.path.display().to_string(),
                    error: e.source.to_string(),
                });
                Vec::new()
            }
        };

        self.execute_targets(targets).await
    }

    /// Probe `targets` and collect every result
    ///
    /// Fails only on an invalid configuration or if the HTTP client cannot be
    /// set up; probe, sink and reporter failures end up in the summary instead.
    pub async fn execute_targets(&self, targets: Vec<Target>) -> Result<CollectionSummary> {
        self.config.validate()?;

        let prober = Prober::new(self.config.timeout(), self.observer.clone())
            .context("failed to build HTTP client")?;

        let dispatcher = Dispatcher::new(prober, self.observer.clone())
            .with_channel_capacity(self.config.channel_capacity)
            .with_max_concurrency(self.config.max_concurrency);

        let collector = Collector::new(
            self.sink.clone(),
            self.reporter.clone(),
            self.observer.clone(),
        );

        info!("probing {} targets", targets.len());
        let results = dispatcher.run(targets);
        let summary = collector.collect(results).await;

        self.observer.on_event(&RunEvent::RunFinished {
            summary: summary.clone(),
        });

        Ok(summary)
    }
}
