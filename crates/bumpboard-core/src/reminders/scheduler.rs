//! One-shot delayed reminders.
//!
//! Uses tokio-cron-scheduler one-shot jobs. Pending reminders live only in
//! memory: anything not yet due when the process stops is dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::PendingReminder;
use crate::error::{BumpError, BumpResult};
use crate::types::Location;

/// Channel for receiving reminders as they come due.
pub type DueReminderReceiver = mpsc::Receiver<PendingReminder>;

type PendingMap = Arc<RwLock<HashMap<Uuid, PendingReminder>>>;

/// Scheduler for delayed reminders.
pub struct ReminderScheduler {
    /// The job scheduler.
    scheduler: JobScheduler,
    /// Armed reminders that have not fired yet.
    pending: PendingMap,
    /// Channel for sending due reminders.
    due_sender: mpsc::Sender<PendingReminder>,
    /// Whether scheduler is running.
    running: RwLock<bool>,
}

impl ReminderScheduler {
    /// Create a new scheduler.
    ///
    /// Returns the scheduler and a receiver for due reminders.
    pub async fn new() -> BumpResult<(Self, DueReminderReceiver)> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| BumpError::scheduler(format!("Failed to create scheduler: {}", e)))?;

        let (tx, rx) = mpsc::channel(100);

        Ok((
            Self {
                scheduler,
                pending: Arc::new(RwLock::new(HashMap::new())),
                due_sender: tx,
                running: RwLock::new(false),
            },
            rx,
        ))
    }

    /// Start the scheduler.
    pub async fn start(&self) -> BumpResult<()> {
        let mut running = self.running.write().await;
        if !*running {
            self.scheduler
                .start()
                .await
                .map_err(|e| BumpError::scheduler(format!("Failed to start scheduler: {}", e)))?;
            *running = true;
        }
        Ok(())
    }

    /// Stop the scheduler and discard every pending reminder.
    ///
    /// Returns how many reminders were discarded. They are never re-armed.
    pub async fn shutdown(&self) -> BumpResult<usize> {
        let discarded = {
            let mut pending = self.pending.write().await;
            let count = pending.len();
            pending.clear();
            count
        };
        if discarded > 0 {
            warn!(discarded, "Discarding pending reminders on shutdown");
        }

        let mut running = self.running.write().await;
        if *running {
            let mut scheduler = self.scheduler.clone();
            scheduler
                .shutdown()
                .await
                .map_err(|e| BumpError::scheduler(format!("Failed to shutdown scheduler: {}", e)))?;
            *running = false;
        }
        Ok(discarded)
    }

    /// Check if scheduler is running.
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Arm a reminder for `user_id` at `target`, due after `delay`.
    ///
    /// Reminders are independent: arming twice for the same user yields two
    /// deliveries.
    pub async fn schedule_reminder(
        &self,
        user_id: &str,
        target: Location,
        delay: Duration,
    ) -> BumpResult<Uuid> {
        let reminder = PendingReminder::new(user_id, target, delay)?;
        let id = reminder.id;
        self.pending.write().await.insert(id, reminder.clone());

        if delay.is_zero() {
            // Already due
            let pending = self.pending.clone();
            let sender = self.due_sender.clone();
            tokio::spawn(async move { deliver(&pending, &sender, id).await });
            return Ok(id);
        }

        let pending = self.pending.clone();
        let sender = self.due_sender.clone();
        let job = Job::new_one_shot_async(delay, move |_uuid, _lock| {
            let pending = pending.clone();
            let sender = sender.clone();
            Box::pin(async move { deliver(&pending, &sender, id).await })
        })
        .map_err(|e| BumpError::scheduler(format!("Failed to create one-shot job: {}", e)));

        let added = match job {
            Ok(job) => self
                .scheduler
                .add(job)
                .await
                .map(|_| ())
                .map_err(|e| BumpError::scheduler(format!("Failed to add job: {}", e))),
            Err(e) => Err(e),
        };

        if let Err(e) = added {
            self.pending.write().await.remove(&id);
            return Err(e);
        }

        debug!(
            reminder_id = %id,
            user_id = %reminder.user_id,
            target = %reminder.target,
            due_at = %reminder.due_at,
            "Reminder armed"
        );
        Ok(id)
    }

    /// Reminders armed but not yet fired.
    pub async fn pending(&self) -> Vec<PendingReminder> {
        let mut pending: Vec<_> = self.pending.read().await.values().cloned().collect();
        pending.sort_by_key(|r| r.due_at);
        pending
    }

    /// Number of reminders armed but not yet fired.
    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }
}

/// Hand a due reminder to the receiver, at most once per id.
async fn deliver(pending: &PendingMap, sender: &mpsc::Sender<PendingReminder>, id: Uuid) {
    let Some(reminder) = pending.write().await.remove(&id) else {
        return;
    };
    let user_id = reminder.user_id.clone();
    let lateness_ms = (Utc::now() - reminder.due_at).num_milliseconds();
    if sender.send(reminder).await.is_err() {
        warn!(reminder_id = %id, user_id = %user_id, "Reminder due but nobody is receiving; dropped");
    } else {
        info!(reminder_id = %id, user_id = %user_id, lateness_ms, "Reminder due");
    }
}
