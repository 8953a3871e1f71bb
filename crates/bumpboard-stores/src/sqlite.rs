//! SQLite leaderboard store.
//!
//! Same table layout and upsert as the PostgreSQL store, for local runs and
//! tests.
//!
//! # Example
//!
//! ```ignore
//! use bumpboard_stores::SqliteLeaderboardStore;
//!
//! let store = SqliteLeaderboardStore::new("bumps.db", LeaderboardSchema::default())?;
//! store.ensure_schema().await?;
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use bumpboard_core::config::{LeaderboardSchema, StoreProvider};
use bumpboard_core::error::{BumpError, BumpResult};
use bumpboard_core::traits::LeaderboardStore;
use bumpboard_core::types::{BumpRecord, LeaderboardEntry};

use crate::sql::{Dialect, LeaderboardSql};

/// SQLite-backed leaderboard store.
pub struct SqliteLeaderboardStore {
    /// Connection, taken on close.
    conn: Mutex<Option<Connection>>,
    sql: LeaderboardSql,
    schema: LeaderboardSchema,
    /// Set once the table is known to exist.
    schema_ready: AtomicBool,
}

impl SqliteLeaderboardStore {
    /// Open (or create) the database at `path`. `:memory:` is accepted.
    pub fn new(path: impl AsRef<Path>, schema: LeaderboardSchema) -> BumpResult<Self> {
        schema.validate()?;
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(|e| BumpError::StoreUnavailable {
            message: format!("Failed to open SQLite database {}: {}", path.display(), e),
            code: bumpboard_core::error::ErrorCode::StoreConnectionFailed,
            source: Some(Box::new(e)),
        })?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| BumpError::store_with_source("Failed to set busy timeout", e))?;

        debug!(path = %path.display(), table = %schema.table, "Opened SQLite leaderboard store");

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            sql: LeaderboardSql::new(&schema, Dialect::Sqlite),
            schema,
            schema_ready: AtomicBool::new(false),
        })
    }

    /// In-memory store with the default table layout.
    pub fn in_memory() -> BumpResult<Self> {
        Self::new(":memory:", LeaderboardSchema::default())
    }

    pub fn schema(&self) -> &LeaderboardSchema {
        &self.schema
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> BumpResult<T>) -> BumpResult<T> {
        let guard = self
            .conn
            .lock()
            .map_err(|e| BumpError::connection(format!("Failed to acquire lock: {}", e)))?;
        let conn = guard
            .as_ref()
            .ok_or_else(|| BumpError::store("SQLite store is closed"))?;
        f(conn)
    }
}

#[async_trait]
impl LeaderboardStore for SqliteLeaderboardStore {
    async fn ensure_schema(&self) -> BumpResult<()> {
        self.with_conn(|conn| {
            conn.execute_batch(&self.sql.create_table).map_err(|e| {
                BumpError::schema(
                    format!("Failed to create table '{}': {}", self.schema.table, e),
                    e,
                )
            })
        })?;
        self.schema_ready.store(true, Ordering::Release);
        info!(table = %self.schema.table, "Leaderboard table ready");
        Ok(())
    }

    async fn record_bump(&self, user_id: &str, display_name: &str) -> BumpResult<()> {
        if !self.schema_ready.load(Ordering::Acquire) {
            self.ensure_schema().await?;
        }
        self.with_conn(|conn| {
            conn.execute(&self.sql.upsert, params![user_id, display_name])
                .map_err(|e| {
                    BumpError::store_with_source(
                        format!("Failed to record bump for '{}': {}", user_id, e),
                        e,
                    )
                })
        })?;
        Ok(())
    }

    async fn top_n(&self, n: usize) -> BumpResult<Vec<LeaderboardEntry>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(n).unwrap_or(i64::MAX);

        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached(&self.sql.top_n)
                .map_err(|e| BumpError::store_with_source("Failed to prepare leaderboard query", e))?;
            let rows = stmt
                .query_map(params![limit], |row| {
                    let count: i64 = row.get(1)?;
                    Ok(LeaderboardEntry::new(
                        row.get::<_, String>(0)?,
                        u64::try_from(count).unwrap_or(0),
                    ))
                })
                .map_err(|e| BumpError::store_with_source("Failed to read leaderboard", e))?;

            let entries = rows
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| BumpError::store_with_source("Failed to read leaderboard row", e))?;
            Ok(entries)
        })
    }

    async fn get(&self, user_id: &str) -> BumpResult<Option<BumpRecord>> {
        self.with_conn(|conn| {
            conn.query_row(&self.sql.get, params![user_id], |row| {
                let count: i64 = row.get(2)?;
                Ok(BumpRecord {
                    user_id: row.get(0)?,
                    display_name: row.get(1)?,
                    count: u64::try_from(count).unwrap_or(0),
                })
            })
            .optional()
            .map_err(|e| BumpError::store_with_source(format!("Failed to read '{}'", user_id), e))
        })
    }

    async fn ping(&self) -> BumpResult<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map(|_| ())
                .map_err(|e| BumpError::store_with_source("SQLite ping failed", e))
        })
    }

    async fn close(&self) {
        match self.conn.lock() {
            Ok(mut guard) => {
                if let Some(conn) = guard.take() {
                    if let Err((_, e)) = conn.close() {
                        tracing::warn!(error = %e, "Failed to close SQLite connection");
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "SQLite store lock poisoned on close"),
        }
        debug!("SQLite leaderboard store closed");
    }

    fn provider(&self) -> StoreProvider {
        StoreProvider::Sqlite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpboard_core::config::TableVariant;
    use std::sync::Arc;

    async fn create_test_store() -> SqliteLeaderboardStore {
        let store = SqliteLeaderboardStore::in_memory().unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    fn table_count(store: &SqliteLeaderboardStore, table: &str) -> i64 {
        store
            .with_conn(|conn| {
                Ok(conn
                    .query_row(
                        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                        params![table],
                        |row| row.get(0),
                    )
                    .unwrap())
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let store = SqliteLeaderboardStore::in_memory().unwrap();
        store.ensure_schema().await.unwrap();
        store.record_bump("U1", "Ana").await.unwrap();
        store.ensure_schema().await.unwrap();

        assert_eq!(table_count(&store, "bump_leaderboard"), 1);
        // Existing rows survive a second call
        assert_eq!(store.get("U1").await.unwrap().unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_new_user_then_rename() {
        let store = create_test_store().await;

        store.record_bump("U1", "Ana").await.unwrap();
        let record = store.get("U1").await.unwrap().unwrap();
        assert_eq!(record.count, 1);
        assert_eq!(record.display_name, "Ana");

        store.record_bump("U1", "Ana B").await.unwrap();
        let record = store.get("U1").await.unwrap().unwrap();
        assert_eq!(record.count, 2);
        assert_eq!(record.display_name, "Ana B");
    }

    #[tokio::test]
    async fn test_concurrent_bumps_are_all_counted() {
        let store = Arc::new(create_test_store().await);

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.record_bump("U7", "Kai").await })
            })
            .collect();
        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        assert_eq!(store.get("U7").await.unwrap().unwrap().count, 50);
    }

    #[tokio::test]
    async fn test_top_n_ordering_and_ties() {
        let store = create_test_store().await;
        for (user, name, times) in [("A", "Ann", 5), ("B", "Bo", 9), ("C", "Cy", 9), ("D", "Di", 1)] {
            for _ in 0..times {
                store.record_bump(user, name).await.unwrap();
            }
        }

        let top = store.top_n(3).await.unwrap();
        assert_eq!(
            top,
            vec![
                LeaderboardEntry::new("Bo", 9),
                LeaderboardEntry::new("Cy", 9),
                LeaderboardEntry::new("Ann", 5),
            ]
        );
        // Same order on every call
        assert_eq!(store.top_n(3).await.unwrap(), top);
        assert_eq!(store.top_n(10).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_top_n_empty_and_zero() {
        let store = create_test_store().await;
        assert!(store.top_n(10).await.unwrap().is_empty());

        store.record_bump("U1", "Ana").await.unwrap();
        assert!(store.top_n(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let store = create_test_store().await;
        assert!(store.get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bumps_table_variant() {
        let store =
            SqliteLeaderboardStore::new(":memory:", LeaderboardSchema::for_variant(TableVariant::Bumps))
                .unwrap();
        store.ensure_schema().await.unwrap();
        store.record_bump("U1", "Ana").await.unwrap();

        assert_eq!(table_count(&store, "bumps"), 1);
        assert_eq!(table_count(&store, "bump_leaderboard"), 0);
        assert_eq!(store.top_n(1).await.unwrap(), vec![LeaderboardEntry::new("Ana", 1)]);
    }

    #[tokio::test]
    async fn test_first_bump_creates_missing_table() {
        // Same state as a startup whose schema call failed
        let store = SqliteLeaderboardStore::in_memory().unwrap();
        assert_eq!(table_count(&store, "bump_leaderboard"), 0);

        store.record_bump("U1", "Ana").await.unwrap();
        assert_eq!(store.get("U1").await.unwrap().unwrap().count, 1);

        for _ in 0..4 {
            store.record_bump("U1", "Ana").await.unwrap();
        }
        assert_eq!(store.get("U1").await.unwrap().unwrap().count, 5);
        assert_eq!(table_count(&store, "bump_leaderboard"), 1);
    }

    #[tokio::test]
    async fn test_table_dropped_after_ready_is_store_error() {
        let store = create_test_store().await;
        store
            .with_conn(|conn| Ok(conn.execute_batch("DROP TABLE bump_leaderboard").unwrap()))
            .unwrap();

        let err = store.record_bump("U1", "Ana").await.unwrap_err();
        assert!(err.is_store_unavailable());
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_closed_store_bump_fails_without_schema() {
        let store = SqliteLeaderboardStore::in_memory().unwrap();
        store.close().await;
        assert!(store.record_bump("U1", "Ana").await.is_err());
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bumps.db");

        {
            let store = SqliteLeaderboardStore::new(&path, LeaderboardSchema::default()).unwrap();
            store.ensure_schema().await.unwrap();
            store.record_bump("U1", "Ana").await.unwrap();
            store.close().await;
        }

        let reopened = SqliteLeaderboardStore::new(&path, LeaderboardSchema::default()).unwrap();
        reopened.ensure_schema().await.unwrap();
        reopened.record_bump("U1", "Ana").await.unwrap();
        assert_eq!(reopened.get("U1").await.unwrap().unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let store = create_test_store().await;
        assert!(store.ping().await.is_ok());
        store.close().await;
        assert!(store.ping().await.is_err());
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let schema = LeaderboardSchema {
            table: "x; DROP TABLE y".to_string(),
            ..Default::default()
        };
        assert!(SqliteLeaderboardStore::new(":memory:", schema).is_err());
    }
}
