//! Tick scheduling
//!
//! The input core never owns a loop. It registers one callback and re-arms it
//! after every tick with the period minus however late the tick ran, so the
//! cadence stays stable even when a tick is delayed.

pub mod tokio_scheduler;

pub use tokio_scheduler::TokioTickScheduler;

use std::sync::Arc;
use std::time::Duration;

/// Called with the lateness of the tick: how far past its deadline it fired
pub type TickCallback = Arc<dyn Fn(Duration) + Send + Sync>;

// Timing errors
#[derive(Debug, thiserror::Error)]
pub enum TimingError {
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),
}

/// One-shot timer service driving the input tick
pub trait TickScheduler: Send + Sync {
    /// Installs the tick callback and re-enables scheduling
    fn register(&self, callback: TickCallback);

    /// Fires the callback once after `delay`
    fn schedule(&self, delay: Duration);

    /// Cancels the pending tick; later `schedule` calls are ignored until the next `register`
    fn unschedule(&self);
}
