//! Fan-out of probers over a target list
//!
//! ## Lifecycle
//!
//! ```text
//! register N units ─► spawn N probers ─► each: probe → send → arrive
//!                  └► spawn 1 waiter ──► barrier.wait() → drop last sender
//! ```
//!
//! Probers only hold a sender clone until their one send has completed, and
//! the dispatcher's own sender lives in the waiter. The channel therefore
//! closes exactly once, right after the final prober has delivered.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, instrument};

use crate::observer::{RunEvent, SharedObserver};
use crate::{ProbeResult, Target};

use super::barrier::CompletionBarrier;
use super::prober::Prober;

/// Default capacity of the result channel
///
/// tokio channels cannot be zero-sized; one slot is the closest thing to a
/// rendezvous channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1;

/// Launches one prober per target and funnels their results into a stream
pub struct Dispatcher {
    prober: Prober,

    observer: SharedObserver,

    channel_capacity: usize,

    /// Cap on probes in flight, `None` means every target at once
    max_concurrency: Option<usize>,
}

impl Dispatcher {
    pub fn new(prober: Prober, observer: SharedObserver) -> Self {
        Self {
            prober,
            observer,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_concurrency: None,
        }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit.map(|n| n.max(1));
        self
    }

    /// Start probing every target
    ///
    /// Must be called from within a tokio runtime. Returns immediately; the
    /// stream yields results in completion order and ends once every target
    /// has produced exactly one result.
    #[instrument(skip_all, fields(targets = targets.len()))]
    pub fn run(&self, targets: Vec<Target>) -> ResultStream {
        let (result_tx, result_rx) = mpsc::channel(self.channel_capacity);

        let barrier = Arc::new(CompletionBarrier::new());
        barrier.register(targets.len());

        let limiter = self
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit)));

        debug!(
            max_concurrency = ?self.max_concurrency,
            "dispatching {} probes",
            targets.len()
        );

        for target in targets {
            let prober = self.prober.clone();
            let observer = self.observer.clone();
            let result_tx = result_tx.clone();
            let limiter = limiter.clone();
            let arrival = barrier.guard();

            tokio::spawn(async move {
                let permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };

                let result = prober.probe(&target).await;
                drop(permit);

                if result_tx.send(result).await.is_err() {
                    observer.on_event(&RunEvent::ResultDropped {
                        url: target.url().to_string(),
                    });
                }

                drop(result_tx);
                drop(arrival);
            });
        }

        let observer = self.observer.clone();
        tokio::spawn(async move {
            barrier.wait().await;
            drop(result_tx);
            observer.on_event(&RunEvent::ChannelClosed);
        });

        ResultStream { rx: result_rx }
    }
}

/// Results of a dispatch, in the order they were delivered
pub struct ResultStream {
    rx: mpsc::Receiver<ProbeResult>,
}

impl ResultStream {
    /// Receive the next result, `None` once every prober has finished
    pub async fn recv(&mut self) -> Option<ProbeResult> {
        self.rx.recv().await
    }
}

impl Stream for ResultStream {
    type Item = ProbeResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
