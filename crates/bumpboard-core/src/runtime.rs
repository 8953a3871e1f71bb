//! Background runtime for reminders and store health.
//!
//! Manages the lifecycle of the ReminderScheduler, its dispatcher task and
//! the store HealthMonitor, providing unified startup and shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{BumpError, BumpResult};
use crate::health::{HealthMonitor, PoolErrorReports};
use crate::reminders::{DueReminderReceiver, ReminderDispatcher, ReminderScheduler};
use crate::traits::{LeaderboardStore, Notifier};

/// Configuration for the BumpRuntime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Interval between store keep-alive queries (default: 120s).
    pub keepalive_interval: Duration,
    /// Whether to run the store health monitor (default: true).
    pub enable_health_monitor: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: Duration::from_secs(120),
            enable_health_monitor: true,
        }
    }
}

impl RuntimeConfig {
    pub fn from_store_config(store: &StoreConfig) -> Self {
        Self {
            keepalive_interval: Duration::from_secs(store.keepalive_interval_secs),
            ..Default::default()
        }
    }

    /// Set the keep-alive interval, at least one second.
    pub fn with_keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval.max(Duration::from_secs(1));
        self
    }

    /// Disable the store health monitor.
    pub fn without_health_monitor(mut self) -> Self {
        self.enable_health_monitor = false;
        self
    }
}

/// Background runtime owning the reminder scheduler and health monitor.
///
/// # Example
///
/// ```ignore
/// use bumpboard_core::{BumpRuntime, RuntimeConfig};
///
/// let mut runtime = BumpRuntime::new(RuntimeConfig::default(), store, notifier, None).await?;
/// runtime.start().await?;
/// // ... hand runtime.reminders() to the coordinator ...
/// runtime.shutdown().await?;
/// ```
pub struct BumpRuntime {
    reminders: Arc<ReminderScheduler>,
    /// Due reminder receiver, moved into the dispatcher on start.
    due_rx: Option<DueReminderReceiver>,
    dispatcher: Option<JoinHandle<()>>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn LeaderboardStore>,
    pool_reports: Option<PoolErrorReports>,
    health: Option<HealthMonitor>,
    config: RuntimeConfig,
}

impl BumpRuntime {
    /// Create the runtime without starting anything.
    pub async fn new(
        config: RuntimeConfig,
        store: Arc<dyn LeaderboardStore>,
        notifier: Arc<dyn Notifier>,
        pool_reports: Option<PoolErrorReports>,
    ) -> BumpResult<Self> {
        debug!(
            health_monitor = config.enable_health_monitor,
            keepalive_secs = config.keepalive_interval.as_secs(),
            provider = %store.provider(),
            "Creating BumpRuntime"
        );

        let (scheduler, due_rx) = ReminderScheduler::new().await?;

        Ok(Self {
            reminders: Arc::new(scheduler),
            due_rx: Some(due_rx),
            dispatcher: None,
            notifier,
            store,
            pool_reports,
            health: None,
            config,
        })
    }

    /// Start the scheduler, the reminder dispatcher and the health monitor.
    pub async fn start(&mut self) -> BumpResult<()> {
        let due_rx = self
            .due_rx
            .take()
            .ok_or_else(|| BumpError::internal("BumpRuntime already started"))?;

        self.dispatcher = Some(ReminderDispatcher::new(self.notifier.clone()).spawn(due_rx));
        self.reminders.start().await?;
        info!("Reminder scheduler started");

        if self.config.enable_health_monitor {
            self.health = Some(HealthMonitor::spawn(
                self.store.clone(),
                self.pool_reports.take(),
                self.config.keepalive_interval,
            ));
        }

        info!("Background runtime started");
        Ok(())
    }

    /// Stop everything and close the store.
    ///
    /// Pending reminders are discarded; the count is returned.
    pub async fn shutdown(&mut self) -> BumpResult<usize> {
        debug!("Shutting down background runtime");

        let discarded = self.reminders.shutdown().await?;

        if let Some(handle) = self.dispatcher.take() {
            // The scheduler keeps its sender alive, so the dispatcher never
            // sees a closed channel on its own.
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Reminder dispatcher ended abnormally");
                }
            }
        }

        if let Some(mut health) = self.health.take() {
            health.shutdown().await;
        }

        self.store.close().await;
        info!(discarded_reminders = discarded, "Background runtime stopped");
        Ok(discarded)
    }

    /// Scheduler to hand to the coordinator.
    pub fn reminders(&self) -> Arc<ReminderScheduler> {
        self.reminders.clone()
    }

    pub fn store(&self) -> Arc<dyn LeaderboardStore> {
        self.store.clone()
    }

    pub fn health(&self) -> Option<&HealthMonitor> {
        self.health.as_ref()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}
