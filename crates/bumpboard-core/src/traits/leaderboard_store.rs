//! Leaderboard store trait.

use async_trait::async_trait;

use crate::config::StoreProvider;
use crate::error::BumpResult;
use crate::types::{BumpRecord, LeaderboardEntry};

/// Durable per-user bump counters.
///
/// Implementations hold their own connection pool and must accept many
/// concurrent calls without the caller holding a lock. All coordination for
/// concurrent bumps of the same user lives in the atomicity of
/// [`record_bump`](LeaderboardStore::record_bump).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    /// Create the counter table if it is absent. Idempotent and safe to call
    /// concurrently.
    async fn ensure_schema(&self) -> BumpResult<()>;

    /// Insert the user with a count of 1, or increment their count and
    /// overwrite the display name, as one atomic statement.
    async fn record_bump(&self, user_id: &str, display_name: &str) -> BumpResult<()>;

    /// Up to `n` entries ordered by count descending, ties by user id.
    async fn top_n(&self, n: usize) -> BumpResult<Vec<LeaderboardEntry>>;

    /// Fetch one user's record.
    async fn get(&self, user_id: &str) -> BumpResult<Option<BumpRecord>>;

    /// Trivial liveness query.
    async fn ping(&self) -> BumpResult<()>;

    /// Single reconnection attempt after a reported pool error.
    ///
    /// Must not retry or report pool errors itself, otherwise one failure
    /// would feed the health monitor forever.
    async fn check_connection(&self) -> BumpResult<()> {
        self.ping().await
    }

    /// Periodic maintenance run by the health monitor.
    async fn keep_alive(&self) -> BumpResult<()> {
        self.ping().await
    }

    /// Release pooled connections.
    async fn close(&self);

    /// Backend of this store.
    fn provider(&self) -> StoreProvider;
}
