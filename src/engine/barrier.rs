//! One-shot completion barrier
//!
//! Counts outstanding units of work. Units are registered up front, each one
//! arrives exactly once, and waiters are released when the count hits zero.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;
use tracing::{trace, warn};

/// Countdown latch for a known-size group of concurrent tasks
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    pending: AtomicUsize,
    notify: Notify,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `units` outstanding units. Must happen before any of them can arrive.
    pub fn register(&self, units: usize) {
        let before = self.pending.fetch_add(units, Ordering::SeqCst);
        trace!("registered {units} units ({} pending)", before + units);
    }

    /// Record completion of one unit
    ///
    /// Returns `true` for the single call that brought the count to zero.
    /// Arriving with nothing pending is ignored.
    pub fn arrive(&self) -> bool {
        let previous = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                count.checked_sub(1)
            });

        match previous {
            Ok(1) => {
                trace!("last unit arrived");
                self.notify.notify_waiters();
                true
            }
            Ok(_) => false,
            Err(_) => {
                warn!("unit arrived at a barrier with nothing pending");
                false
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_complete(&self) -> bool {
        self.pending() == 0
    }

    /// Suspend until every registered unit has arrived
    ///
    /// Returns immediately if nothing is pending.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register interest before checking so a concurrent final arrive
            // cannot slip between the check and the await.
            notified.as_mut().enable();

            if self.is_complete() {
                return;
            }

            notified.await;
        }
    }

    /// Guard that arrives when dropped, so a unit is accounted for even if its
    /// task unwinds
    pub fn guard(self: &Arc<Self>) -> ArrivalGuard {
        ArrivalGuard {
            barrier: Arc::clone(self),
        }
    }
}

#[derive(Debug)]
pub struct ArrivalGuard {
    barrier: Arc<CompletionBarrier>,
}

impl Drop for ArrivalGuard {
    fn drop(&mut self) {
        self.barrier.arrive();
    }
}
