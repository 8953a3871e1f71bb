//! Store connection health maintenance.
//!
//! Best-effort self-healing only: a keep-alive query on a fixed interval, and
//! one reconnection attempt per reported pool error. Callers still see
//! `StoreUnavailable` from store operations when the store is down.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::traits::LeaderboardStore;

/// Default capacity of the pool error channel.
const DEFAULT_CAPACITY: usize = 16;

/// A pool-level failure noticed by a store.
#[derive(Debug, Clone)]
pub struct PoolErrorReport {
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Receiving side of pool error reports.
pub type PoolErrorReports = mpsc::Receiver<PoolErrorReport>;

/// Handle stores use to report pool errors.
#[derive(Debug, Clone)]
pub struct PoolErrorReporter {
    sender: mpsc::Sender<PoolErrorReport>,
}

impl PoolErrorReporter {
    /// Report an error without waiting. Reports are dropped when the monitor
    /// is behind or gone.
    pub fn report(&self, message: impl Into<String>) {
        let _ = self.sender.try_send(PoolErrorReport {
            message: message.into(),
            at: Utc::now(),
        });
    }
}

/// Create a reporter and the matching receiver for [`HealthMonitor::spawn`].
pub fn error_channel() -> (PoolErrorReporter, PoolErrorReports) {
    let (sender, receiver) = mpsc::channel(DEFAULT_CAPACITY);
    (PoolErrorReporter { sender }, receiver)
}

/// Counters for what the monitor has done.
#[derive(Debug, Default)]
pub struct HealthStats {
    keepalives: AtomicU64,
    keepalive_failures: AtomicU64,
    probes: AtomicU64,
    probe_failures: AtomicU64,
}

impl HealthStats {
    pub fn keepalives(&self) -> u64 {
        self.keepalives.load(Ordering::Relaxed)
    }

    pub fn keepalive_failures(&self) -> u64 {
        self.keepalive_failures.load(Ordering::Relaxed)
    }

    pub fn probes(&self) -> u64 {
        self.probes.load(Ordering::Relaxed)
    }

    pub fn probe_failures(&self) -> u64 {
        self.probe_failures.load(Ordering::Relaxed)
    }
}

/// Background keep-alive and reconnection probing for a store.
pub struct HealthMonitor {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    stats: Arc<HealthStats>,
}

impl HealthMonitor {
    /// Start monitoring `store`.
    pub fn spawn(
        store: Arc<dyn LeaderboardStore>,
        reports: Option<PoolErrorReports>,
        keepalive_interval: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let stats = Arc::new(HealthStats::default());
        let period = keepalive_interval.max(Duration::from_millis(10));

        let handle = tokio::spawn(run(store, reports, period, cancel.clone(), stats.clone()));
        info!(keepalive_secs = period.as_secs(), "Store health monitor started");

        Self {
            cancel,
            handle: Some(handle),
            stats,
        }
    }

    pub fn stats(&self) -> Arc<HealthStats> {
        self.stats.clone()
    }

    /// Stop the monitor and wait for its task.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Health monitor task ended abnormally");
            }
        }
        debug!("Store health monitor stopped");
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    store: Arc<dyn LeaderboardStore>,
    mut reports: Option<PoolErrorReports>,
    period: Duration,
    cancel: CancellationToken,
    stats: Arc<HealthStats>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                stats.keepalives.fetch_add(1, Ordering::Relaxed);
                if let Err(e) = store.keep_alive().await {
                    stats.keepalive_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, "Store keep-alive failed");
                }
            }
            report = recv_report(&mut reports) => match report {
                Some(report) => {
                    error!(
                        error = %report.message,
                        at = %report.at,
                        "Store connection lost. Attempting to reconnect..."
                    );
                    stats.probes.fetch_add(1, Ordering::Relaxed);
                    match store.check_connection().await {
                        Ok(()) => info!("Store reconnected successfully"),
                        Err(e) => {
                            stats.probe_failures.fetch_add(1, Ordering::Relaxed);
                            error!(error = %e, "Reconnection attempt failed");
                        }
                    }
                }
                None => reports = None,
            },
        }
    }
}

async fn recv_report(reports: &mut Option<PoolErrorReports>) -> Option<PoolErrorReport> {
    match reports {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
