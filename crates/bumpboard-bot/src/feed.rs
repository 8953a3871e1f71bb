//! Line-delimited JSON event feed.
//!
//! Stands in for the chat transport: every line is one event, handled on its
//! own task.

use std::sync::Arc;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use bumpboard_core::{BumpCoordinator, InboundMessage, Location, MessageOutcome};

/// One line of the feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    /// A chat message to classify.
    Message(InboundMessage),
    /// A request to post the leaderboard.
    Leaderboard {
        location: Location,
        #[serde(default)]
        limit: Option<usize>,
    },
}

impl Envelope {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// Handle one envelope.
pub async fn handle(coordinator: &BumpCoordinator, envelope: Envelope) {
    match envelope {
        Envelope::Message(message) => {
            if let MessageOutcome::Processed { store, reminder, .. } =
                coordinator.handle_message(&message).await
            {
                debug!(?store, ?reminder, "Bump processed");
            }
        }
        Envelope::Leaderboard { location, limit } => {
            if let Err(e) = coordinator.post_leaderboard(&location, limit).await {
                error!(location = %location, error = %e, "Failed to post leaderboard");
            }
        }
    }
}

/// Read events until EOF, then wait for in-flight events to finish.
///
/// Returns the number of lines handed to the coordinator.
pub async fn run<R>(coordinator: Arc<BumpCoordinator>, input: R) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    let mut tasks = JoinSet::new();
    let mut accepted = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let envelope = match Envelope::parse(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Skipping malformed event line");
                continue;
            }
        };

        accepted += 1;
        let coordinator = coordinator.clone();
        tasks.spawn(async move { handle(&coordinator, envelope).await });

        // Reap finished tasks so the set stays small on long feeds
        while let Some(result) = tasks.try_join_next() {
            log_join(result);
        }
    }

    while let Some(result) = tasks.join_next().await {
        log_join(result);
    }
    debug!(accepted, "Event feed ended");
    Ok(accepted)
}

fn log_join(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Event task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpboard_core::notify::{notices, MemoryNotifier};
    use bumpboard_core::{
        BumpClassifier, CoordinatorConfig, LeaderboardStore, ReminderScheduler,
    };
    use bumpboard_stores::SqliteLeaderboardStore;
    use std::time::Duration;

    #[test]
    fn test_parse_message_envelope() {
        let line = r#"{"type":"message","author_id":"BOT","text":"hi","mentioned_user_ids":["U42"],"mentioned_display_names":["Nova"],"source_location":"c1"}"#;
        let envelope = Envelope::parse(line).unwrap();
        assert_eq!(
            envelope,
            Envelope::Message(InboundMessage::new("BOT", "hi", "c1").with_mention("U42", "Nova"))
        );
    }

    #[test]
    fn test_parse_leaderboard_envelope() {
        let envelope = Envelope::parse(r#"{"type":"leaderboard","location":"c1"}"#).unwrap();
        assert_eq!(
            envelope,
            Envelope::Leaderboard {
                location: Location::new("c1"),
                limit: None
            }
        );

        let envelope =
            Envelope::parse(r#"{"type":"leaderboard","location":"c1","limit":3}"#).unwrap();
        assert!(matches!(envelope, Envelope::Leaderboard { limit: Some(3), .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        assert!(Envelope::parse(r#"{"type":"reaction","location":"c1"}"#).is_err());
        assert!(Envelope::parse("not json").is_err());
    }

    #[tokio::test]
    async fn test_feed_end_to_end() {
        let store = Arc::new(SqliteLeaderboardStore::in_memory().unwrap());
        store.ensure_schema().await.unwrap();
        let (scheduler, _due) = ReminderScheduler::new().await.unwrap();
        let scheduler = Arc::new(scheduler);
        let notifier = Arc::new(MemoryNotifier::new());

        let coordinator = Arc::new(BumpCoordinator::new(
            BumpClassifier::new("BOT", "Thx for bumping our Server!"),
            store.clone(),
            scheduler.clone(),
            notifier.clone(),
            CoordinatorConfig {
                reminder_delay: Duration::from_secs(3600),
                ..Default::default()
            },
        ));

        let feed = concat!(
            r#"{"type":"message","author_id":"BOT","text":"Thx for bumping our Server! We will remind you in 2 hours!","mentioned_user_ids":["U42"],"mentioned_display_names":["Nova"],"source_location":"bump-channel"}"#,
            "\n",
            "garbage\n",
            "\n",
            r#"{"type":"message","author_id":"someone","text":"Thx for bumping our Server!","mentioned_user_ids":["U1"],"mentioned_display_names":["X"],"source_location":"bump-channel"}"#,
            "\n",
        );
        let accepted = run(coordinator.clone(), feed.as_bytes()).await.unwrap();
        assert_eq!(accepted, 2);

        let record = store.get("U42").await.unwrap().unwrap();
        assert_eq!(record.count, 1);
        assert_eq!(record.display_name, "Nova");
        assert!(store.get("U1").await.unwrap().is_none());
        assert_eq!(scheduler.pending_count().await, 1);

        let board = r#"{"type":"leaderboard","location":"stats"}"#;
        run(coordinator, board.as_bytes()).await.unwrap();

        let posted = notifier.with_title(notices::LEADERBOARD_TITLE).await;
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, Location::new("stats"));
        assert_eq!(posted[0].1.body, "**1.** Nova - **1 bumps**");
    }
}
