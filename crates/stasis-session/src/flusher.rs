//! Background flushing of pending TTL renewals.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::backend::{KvBackend, KvStore, Renewal};
use crate::config::MAX_FLUSH_INTERVAL;
use crate::pending::PendingRenewals;

/// Counts from one flush cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Entries taken from the pending set.
    pub drained: usize,
    /// Renewals applied to existing records.
    pub extended: usize,
    /// Renewals for records that no longer exist.
    pub missing: usize,
    /// Renewals that failed at the store.
    pub failed: usize,
}

/// Drains [`PendingRenewals`] into `EXPIRE` commands.
///
/// Only one flush runs at a time; a second caller waits for the running
/// cycle to finish and then flushes whatever arrived since.
pub struct RenewalFlusher<K> {
    backend: Arc<KvBackend<K>>,
    pending: Arc<PendingRenewals>,
    gate: Mutex<()>,
}

impl<K: KvStore> RenewalFlusher<K> {
    /// Create a flusher over a shared backend and pending set.
    pub fn new(backend: Arc<KvBackend<K>>, pending: Arc<PendingRenewals>) -> Self {
        Self {
            backend,
            pending,
            gate: Mutex::new(()),
        }
    }

    /// Run one flush cycle.
    ///
    /// Every drained entry is consumed whether or not its renewal succeeds.
    /// Failures are logged and never retried within the cycle; a later touch
    /// queues the session again.
    pub async fn flush(&self) -> FlushReport {
        let _guard = self.gate.lock().await;
        let mut report = FlushReport::default();

        while let Some((session_id, ttl_secs)) = self.pending.drain_one() {
            report.drained += 1;
            match self.backend.extend_expiry(&session_id, ttl_secs).await {
                Ok(Renewal::Extended) => report.extended += 1,
                Ok(Renewal::Missing) => {
                    debug!(session_id = %session_id, "Session gone before TTL renewal");
                    report.missing += 1;
                }
                Err(e) => {
                    warn!(
                        session_id = %session_id,
                        ttl_secs,
                        error = %e,
                        "Failed to renew session TTL"
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }
}

/// Owned handle to the recurring flush task.
///
/// The task starts when the handle is created and stops on
/// [`shutdown`](Self::shutdown) or when the handle is dropped. Renewals
/// still pending at that point are abandoned.
#[derive(Debug)]
pub struct FlusherHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl FlusherHandle {
    /// Spawn the flush loop on the current tokio runtime.
    ///
    /// The first flush happens one `interval` after spawning. Ticks missed
    /// while a flush is still running are skipped, not queued. The interval
    /// is capped at [`MAX_FLUSH_INTERVAL`] so deadlines cannot overflow.
    pub fn spawn<K: KvStore>(flusher: Arc<RenewalFlusher<K>>, interval: Duration) -> Self {
        let interval = interval.clamp(Duration::from_millis(1), MAX_FLUSH_INTERVAL);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let now = Instant::now();
            let start = now.checked_add(interval).unwrap_or(now);
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("Renewal flusher stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        trace!("Renewal flush start");
                        let report = flusher.flush().await;
                        if report.drained > 0 {
                            debug!(
                                drained = report.drained,
                                extended = report.extended,
                                missing = report.missing,
                                failed = report.failed,
                                "Flushed session TTL renewals"
                            );
                        }
                        trace!("Renewal flush end");
                    }
                }
            }
        });

        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Whether the flush task has been asked to stop.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the flush task and wait for it to exit.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "Renewal flusher task ended abnormally");
        }
    }
}

impl Drop for FlusherHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
