//! Wires classified bumps into the store and the reminder scheduler.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::classifier::{BumpClassifier, Classification, SkipReason};
use crate::config::BumpboardConfig;
use crate::error::BumpResult;
use crate::notify::notices;
use crate::reminders::ReminderScheduler;
use crate::traits::{LeaderboardStore, Notifier};
use crate::types::{BumpEvent, InboundMessage, LeaderboardEntry, Location, Notice};

/// Coordinator settings derived from [`BumpboardConfig`].
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Delay before the follow-up reminder.
    pub reminder_delay: Duration,
    /// Default number of leaderboard rows.
    pub leaderboard_size: usize,
    /// Overrides the source location for acknowledgments and reminders.
    pub notification_location: Option<Location>,
    /// Send a thank-you notice after each recorded bump.
    pub acknowledge: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            reminder_delay: Duration::from_secs(300),
            leaderboard_size: 10,
            notification_location: None,
            acknowledge: true,
        }
    }
}

impl From<&BumpboardConfig> for CoordinatorConfig {
    fn from(config: &BumpboardConfig) -> Self {
        Self {
            reminder_delay: config.reminders.delay(),
            leaderboard_size: config.leaderboard_size,
            notification_location: config.notification_location.as_deref().map(Location::from),
            acknowledge: config.reminders.acknowledge,
        }
    }
}

/// Result of the store update for one qualifying message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    Recorded,
    Failed(String),
}

/// Result of arming the reminder for one qualifying message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderOutcome {
    Armed(Uuid),
    Dropped(String),
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Discarded(SkipReason),
    Processed {
        event: BumpEvent,
        store: StoreOutcome,
        reminder: ReminderOutcome,
    },
}

impl MessageOutcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, MessageOutcome::Processed { .. })
    }
}

/// The leaderboard as shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardView {
    Ranked(Vec<LeaderboardEntry>),
    Empty,
    /// The store could not be read.
    Unavailable,
}

impl LeaderboardView {
    pub fn notice(&self) -> Notice {
        match self {
            LeaderboardView::Ranked(entries) => notices::leaderboard(entries),
            LeaderboardView::Empty => notices::leaderboard(&[]),
            LeaderboardView::Unavailable => notices::leaderboard_unavailable(),
        }
    }
}

/// Pipeline coordinator: classify, count, remind.
pub struct BumpCoordinator {
    classifier: BumpClassifier,
    store: Arc<dyn LeaderboardStore>,
    reminders: Arc<ReminderScheduler>,
    notifier: Arc<dyn Notifier>,
    config: CoordinatorConfig,
}

impl BumpCoordinator {
    pub fn new(
        classifier: BumpClassifier,
        store: Arc<dyn LeaderboardStore>,
        reminders: Arc<ReminderScheduler>,
        notifier: Arc<dyn Notifier>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            classifier,
            store,
            reminders,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Process one inbound message.
    ///
    /// Never fails: a failed store write or reminder is logged and reported
    /// in the outcome, and the other effect is still attempted.
    pub async fn handle_message(&self, message: &InboundMessage) -> MessageOutcome {
        trace!(
            author_id = %message.author_id,
            location = %message.source_location,
            "Message received"
        );

        let event = match self.classifier.classify_detailed(message) {
            Classification::Qualifying(event) => event,
            Classification::Skipped(reason) => {
                debug!(author_id = %message.author_id, reason = %reason, "Message skipped");
                return MessageOutcome::Discarded(reason);
            }
        };

        info!(
            user_id = %event.credited_user_id,
            display_name = %event.credited_display_name,
            "Bump detected"
        );

        let target = self
            .config
            .notification_location
            .clone()
            .unwrap_or_else(|| message.source_location.clone());

        let (store, reminder) = tokio::join!(
            self.record(&event),
            self.arm_reminder(&event.credited_user_id, target.clone())
        );

        if self.config.acknowledge && store == StoreOutcome::Recorded {
            let notice = notices::acknowledgment(&event.credited_user_id);
            if let Err(e) = self.notifier.notify(&target, &notice).await {
                warn!(user_id = %event.credited_user_id, error = %e, "Acknowledgment failed");
            }
        }

        MessageOutcome::Processed {
            event,
            store,
            reminder,
        }
    }

    async fn record(&self, event: &BumpEvent) -> StoreOutcome {
        match self
            .store
            .record_bump(&event.credited_user_id, &event.credited_display_name)
            .await
        {
            Ok(()) => {
                info!(user_id = %event.credited_user_id, "Bump recorded");
                StoreOutcome::Recorded
            }
            Err(e) => {
                error!(
                    user_id = %event.credited_user_id,
                    code = e.code().as_str(),
                    error = %e,
                    "Failed to record bump"
                );
                StoreOutcome::Failed(e.to_string())
            }
        }
    }

    async fn arm_reminder(&self, user_id: &str, target: Location) -> ReminderOutcome {
        match self
            .reminders
            .schedule_reminder(user_id, target, self.config.reminder_delay)
            .await
        {
            Ok(id) => ReminderOutcome::Armed(id),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Reminder dropped");
                ReminderOutcome::Dropped(e.to_string())
            }
        }
    }

    /// Top `n` entries, with store failures turned into
    /// [`LeaderboardView::Unavailable`].
    pub async fn get_leaderboard(&self, n: usize) -> LeaderboardView {
        match self.store.top_n(n).await {
            Ok(entries) if entries.is_empty() => LeaderboardView::Empty,
            Ok(entries) => LeaderboardView::Ranked(entries),
            Err(e) => {
                error!(code = e.code().as_str(), error = %e, "Failed to fetch leaderboard");
                LeaderboardView::Unavailable
            }
        }
    }

    /// Render the default-size leaderboard to `location`.
    pub async fn post_leaderboard(&self, location: &Location, n: Option<usize>) -> BumpResult<()> {
        let view = self
            .get_leaderboard(n.unwrap_or(self.config.leaderboard_size))
            .await;
        self.notifier.notify(location, &view.notice()).await
    }

    /// Store health check for callers that want to fail fast.
    pub async fn ping_store(&self) -> BumpResult<()> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BumpError;
    use crate::notify::MemoryNotifier;
    use crate::traits::MockLeaderboardStore;
    use mockall::predicate::eq;
    use tokio_test::assert_ok;

    const BOT: &str = "BOT";
    const PHRASE: &str = "Thx for bumping our Server!";

    async fn coordinator(
        store: MockLeaderboardStore,
        config: CoordinatorConfig,
    ) -> (BumpCoordinator, Arc<ReminderScheduler>, Arc<MemoryNotifier>) {
        let (scheduler, _rx) = ReminderScheduler::new().await.unwrap();
        let scheduler = Arc::new(scheduler);
        let notifier = Arc::new(MemoryNotifier::new());
        let coordinator = BumpCoordinator::new(
            BumpClassifier::new(BOT, PHRASE),
            Arc::new(store),
            scheduler.clone(),
            notifier.clone(),
            config,
        );
        (coordinator, scheduler, notifier)
    }

    fn long_delay() -> CoordinatorConfig {
        CoordinatorConfig {
            reminder_delay: Duration::from_secs(3600),
            ..Default::default()
        }
    }

    fn confirmation() -> InboundMessage {
        InboundMessage::new(
            BOT,
            "Thx for bumping our Server! We will remind you in 2 hours!",
            "bump-channel",
        )
        .with_mention("U42", "Nova")
    }

    #[tokio::test]
    async fn test_qualifying_message_records_and_arms() {
        let mut store = MockLeaderboardStore::new();
        store
            .expect_record_bump()
            .with(eq("U42"), eq("Nova"))
            .times(1)
            .returning(|_, _| Ok(()));

        let (coordinator, scheduler, notifier) = coordinator(store, long_delay()).await;
        let outcome = coordinator.handle_message(&confirmation()).await;

        match outcome {
            MessageOutcome::Processed { store, reminder, .. } => {
                assert_eq!(store, StoreOutcome::Recorded);
                assert!(matches!(reminder, ReminderOutcome::Armed(_)));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let pending = scheduler.pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, "U42");
        assert_eq!(pending[0].target, Location::new("bump-channel"));

        let acks = notifier.with_title("Thank you for bumping!").await;
        assert_eq!(acks.len(), 1);
        assert_eq!(acks[0].0, Location::new("bump-channel"));
    }

    #[tokio::test]
    async fn test_untrusted_message_touches_nothing() {
        let mut store = MockLeaderboardStore::new();
        store.expect_record_bump().never();

        let (coordinator, scheduler, notifier) = coordinator(store, long_delay()).await;
        let mut message = confirmation();
        message.author_id = "impostor".to_string();

        let outcome = coordinator.handle_message(&message).await;
        assert_eq!(outcome, MessageOutcome::Discarded(SkipReason::UntrustedAuthor));
        assert_eq!(scheduler.pending_count().await, 0);
        assert!(notifier.delivered().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_still_arms_reminder() {
        let mut store = MockLeaderboardStore::new();
        store
            .expect_record_bump()
            .times(1)
            .returning(|_, _| Err(BumpError::connection("pool exhausted")));

        let (coordinator, scheduler, notifier) = coordinator(store, long_delay()).await;
        let outcome = coordinator.handle_message(&confirmation()).await;

        match outcome {
            MessageOutcome::Processed { store, reminder, .. } => {
                assert!(matches!(store, StoreOutcome::Failed(_)));
                assert!(matches!(reminder, ReminderOutcome::Armed(_)));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(scheduler.pending_count().await, 1);
        // No thank-you for a bump that was not counted
        assert!(notifier.delivered().await.is_empty());
    }

    #[tokio::test]
    async fn test_reminder_failure_still_records() {
        let mut store = MockLeaderboardStore::new();
        store.expect_record_bump().times(1).returning(|_, _| Ok(()));

        let config = CoordinatorConfig {
            reminder_delay: Duration::from_secs(u64::MAX),
            ..Default::default()
        };
        let (coordinator, scheduler, _notifier) = coordinator(store, config).await;
        let outcome = coordinator.handle_message(&confirmation()).await;

        match outcome {
            MessageOutcome::Processed { store, reminder, .. } => {
                assert_eq!(store, StoreOutcome::Recorded);
                assert!(matches!(reminder, ReminderOutcome::Dropped(_)));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(scheduler.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_next_event() {
        let mut store = MockLeaderboardStore::new();
        let mut calls = 0;
        store.expect_record_bump().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Err(BumpError::store("deadlock detected"))
            } else {
                Ok(())
            }
        });

        let (coordinator, _scheduler, _notifier) = coordinator(store, long_delay()).await;
        let first = coordinator.handle_message(&confirmation()).await;
        let second = coordinator.handle_message(&confirmation()).await;

        assert!(matches!(
            first,
            MessageOutcome::Processed { store: StoreOutcome::Failed(_), .. }
        ));
        assert!(matches!(
            second,
            MessageOutcome::Processed { store: StoreOutcome::Recorded, .. }
        ));
    }

    #[tokio::test]
    async fn test_notification_location_override() {
        let mut store = MockLeaderboardStore::new();
        store.expect_record_bump().returning(|_, _| Ok(()));

        let config = CoordinatorConfig {
            notification_location: Some(Location::new("general")),
            ..long_delay()
        };
        let (coordinator, scheduler, notifier) = coordinator(store, config).await;
        coordinator.handle_message(&confirmation()).await;

        assert_eq!(scheduler.pending().await[0].target, Location::new("general"));
        assert_eq!(notifier.delivered().await[0].0, Location::new("general"));
    }

    #[tokio::test]
    async fn test_leaderboard_views() {
        let mut store = MockLeaderboardStore::new();
        let mut responses = vec![
            Ok(vec![LeaderboardEntry::new("B", 9), LeaderboardEntry::new("A", 5)]),
            Ok(vec![]),
            Err(BumpError::connection("down")),
        ]
        .into_iter();
        store
            .expect_top_n()
            .with(eq(10))
            .times(3)
            .returning(move |_| responses.next().unwrap());

        let (coordinator, _scheduler, _notifier) = coordinator(store, long_delay()).await;

        let ranked = coordinator.get_leaderboard(10).await;
        assert!(matches!(&ranked, LeaderboardView::Ranked(e) if e.len() == 2));
        assert_eq!(coordinator.get_leaderboard(10).await, LeaderboardView::Empty);

        let unavailable = coordinator.get_leaderboard(10).await;
        assert_eq!(unavailable, LeaderboardView::Unavailable);
        assert_eq!(unavailable.notice().body, notices::LEADERBOARD_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_post_leaderboard_uses_default_size() {
        let mut store = MockLeaderboardStore::new();
        store
            .expect_top_n()
            .with(eq(10))
            .returning(|_| Ok(vec![LeaderboardEntry::new("Nova", 1)]));

        let (coordinator, _scheduler, notifier) = coordinator(store, long_delay()).await;
        assert_ok!(coordinator.post_leaderboard(&Location::new("c1"), None).await);

        let delivered = notifier.delivered().await;
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].1.body, "**1.** Nova - **1 bumps**");
    }
}
