//! Concurrent probe engine
//!
//! ```text
//!   targets ──► Dispatcher ──┬─► Prober ─┐
//!                            ├─► Prober ─┼─► result channel ─► Collector ─┬─► Sink
//!                            └─► Prober ─┘        ▲                       └─► Reporter
//!                                 │               │
//!                                 └─► CompletionBarrier ─► waiter closes channel
//! ```
//!
//! - **Prober**: one timed GET per target, always yields a result
//! - **Dispatcher**: spawns one task per target and owns the barrier
//! - **CompletionBarrier**: counts outstanding probers; reaching zero closes the channel
//! - **Collector**: the only consumer, drains results until the channel closes

pub mod barrier;
pub mod collector;
pub mod dispatcher;
pub mod prober;

pub use barrier::CompletionBarrier;
pub use collector::{CollectionSummary, Collector};
pub use dispatcher::{Dispatcher, ResultStream};
pub use prober::Prober;
