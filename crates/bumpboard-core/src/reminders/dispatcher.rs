use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::{DueReminderReceiver, PendingReminder};
use crate::notify::notices;
use crate::traits::Notifier;

/// Delivers due reminders through a [`Notifier`].
pub struct ReminderDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl ReminderDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Deliver one due reminder.
    pub async fn on_reminder_due(&self, reminder: &PendingReminder) {
        let notice = notices::reminder(&reminder.user_id);
        match self.notifier.notify(&reminder.target, &notice).await {
            Ok(()) => debug!(
                reminder_id = %reminder.id,
                user_id = %reminder.user_id,
                target = %reminder.target,
                "Reminder delivered"
            ),
            Err(e) => error!(
                reminder_id = %reminder.id,
                user_id = %reminder.user_id,
                error = %e,
                "Reminder delivery failed"
            ),
        }
    }

    /// Drain `rx` until the scheduler side is dropped.
    pub fn spawn(self, mut rx: DueReminderReceiver) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(reminder) = rx.recv().await {
                self.on_reminder_due(&reminder).await;
            }
            debug!("Reminder dispatcher stopped");
        })
    }
}
