//! Delayed follow-up reminders.

mod dispatcher;
mod scheduler;

pub use dispatcher::ReminderDispatcher;
pub use scheduler::{DueReminderReceiver, ReminderScheduler};

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BumpError, BumpResult};
use crate::types::Location;

/// A reminder that has been armed and not yet delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReminder {
    pub id: Uuid,
    pub user_id: String,
    /// Where the reminder will be delivered.
    pub target: Location,
    pub created_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

impl PendingReminder {
    pub fn new(user_id: impl Into<String>, target: Location, delay: Duration) -> BumpResult<Self> {
        let created_at = Utc::now();
        let delay = chrono::Duration::from_std(delay)
            .map_err(|e| BumpError::scheduler(format!("Reminder delay out of range: {}", e)))?;
        let due_at = created_at
            .checked_add_signed(delay)
            .ok_or_else(|| BumpError::scheduler("Reminder due time overflows"))?;

        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            target,
            created_at,
            due_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_at_is_created_plus_delay() {
        let r = PendingReminder::new("U1", Location::new("general"), Duration::from_secs(300)).unwrap();
        assert_eq!((r.due_at - r.created_at).num_seconds(), 300);
    }

    #[test]
    fn test_absurd_delay_is_rejected() {
        let r = PendingReminder::new("U1", Location::new("general"), Duration::from_secs(u64::MAX));
        assert!(r.is_err());
    }
}
