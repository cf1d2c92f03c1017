use crate::timing::{TickCallback, TickScheduler, TimingError};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const STATS_INTERVAL_SECS: i64 = 30;

// Stats for performance monitoring
#[derive(Debug)]
struct TickStats {
    ticks: u64,
    total_lateness: Duration,
    max_lateness: Duration,
    since: DateTime<Local>,
}

impl TickStats {
    fn new() -> Self {
        Self {
            ticks: 0,
            total_lateness: Duration::ZERO,
            max_lateness: Duration::ZERO,
            since: Local::now(),
        }
    }

    fn record(&mut self, lateness: Duration) {
        self.ticks += 1;
        self.total_lateness += lateness;
        self.max_lateness = self.max_lateness.max(lateness);

        let now = Local::now();
        let elapsed = now - self.since;
        if elapsed > chrono::Duration::seconds(STATS_INTERVAL_SECS) {
            let seconds = elapsed.num_seconds().max(1);
            debug!(
                "Tick stats: {} ticks in {} seconds ({:.2} ticks/sec)",
                self.ticks,
                seconds,
                self.ticks as f64 / seconds as f64
            );
            debug!(
                "Lateness: average {:.3} ms, max {:.3} ms",
                self.total_lateness.as_secs_f64() * 1000.0 / self.ticks as f64,
                self.max_lateness.as_secs_f64() * 1000.0
            );
            *self = Self::new();
        }
    }
}

/// [`TickScheduler`] running each tick as a tokio task
///
/// Every `schedule` spawns one task that sleeps until the deadline and then
/// invokes the callback. `unschedule` cancels the shared token, which stops the
/// pending sleep and makes any re-arm from an in-flight tick a no-op.
pub struct TokioTickScheduler {
    runtime: Handle,
    callback: Mutex<Option<TickCallback>>,
    cancel: Mutex<CancellationToken>,
    pending: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<Mutex<TickStats>>,
}

impl TokioTickScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            callback: Mutex::new(None),
            cancel: Mutex::new(CancellationToken::new()),
            pending: Mutex::new(None),
            stats: Arc::new(Mutex::new(TickStats::new())),
        }
    }

    /// Scheduler on the runtime the caller is running in
    pub fn current() -> Result<Self, TimingError> {
        let runtime = Handle::try_current().map_err(|e| TimingError::NoRuntime(e.to_string()))?;
        Ok(Self::new(runtime))
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl TickScheduler for TokioTickScheduler {
    fn register(&self, callback: TickCallback) {
        info!("Registering tick callback");
        *self.callback.lock() = Some(callback);

        let mut cancel = self.cancel.lock();
        if cancel.is_cancelled() {
            debug!("Re-enabling scheduling after unschedule");
            *cancel = CancellationToken::new();
        }
    }

    fn schedule(&self, delay: Duration) {
        let token = self.cancel.lock().clone();
        if token.is_cancelled() {
            debug!("Scheduler stopped, dropping tick");
            return;
        }
        let Some(callback) = self.callback.lock().clone() else {
            warn!("Tick scheduled without a registered callback");
            return;
        };

        let deadline = Instant::now() + delay;
        let stats = self.stats.clone();
        let handle = self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Pending tick cancelled");
                }
                _ = tokio::time::sleep_until(deadline) => {
                    let lateness = Instant::now().saturating_duration_since(deadline);
                    stats.lock().record(lateness);
                    callback(lateness);
                }
            }
        });

        *self.pending.lock() = Some(handle);
    }

    fn unschedule(&self) {
        info!("Unscheduling input tick");
        self.cancel.lock().cancel();
        self.pending.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn counting_callback() -> (TickCallback, mpsc::UnboundedReceiver<Duration>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let callback: TickCallback = Arc::new(move |lateness| {
            let _ = sender.send(lateness);
        });
        (callback, receiver)
    }

    #[tokio::test]
    async fn scheduled_tick_fires_once() {
        let scheduler = TokioTickScheduler::current().unwrap();
        let (callback, mut ticks) = counting_callback();
        scheduler.register(callback);

        scheduler.schedule(Duration::from_millis(5));
        let lateness = tokio::time::timeout(Duration::from_secs(1), ticks.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(lateness < Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(ticks.try_recv().is_err());
    }

    #[tokio::test]
    async fn unschedule_cancels_pending_tick() {
        let scheduler = TokioTickScheduler::current().unwrap();
        let (callback, mut ticks) = counting_callback();
        scheduler.register(callback);

        scheduler.schedule(Duration::from_millis(20));
        scheduler.unschedule();
        scheduler.schedule(Duration::from_millis(1));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(ticks.try_recv().is_err());
        assert!(!scheduler.is_pending());
    }

    #[tokio::test]
    async fn register_restarts_after_unschedule() {
        let scheduler = TokioTickScheduler::current().unwrap();
        let (callback, mut ticks) = counting_callback();
        scheduler.register(callback.clone());
        scheduler.unschedule();

        scheduler.register(callback);
        scheduler.schedule(Duration::ZERO);
        assert!(tokio::time::timeout(Duration::from_secs(1), ticks.recv())
            .await
            .unwrap()
            .is_some());
    }

    #[test]
    fn schedule_without_callback_is_ignored() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let scheduler = TokioTickScheduler::new(runtime.handle().clone());

        scheduler.schedule(Duration::ZERO);
        assert!(!scheduler.is_pending());
    }
}
