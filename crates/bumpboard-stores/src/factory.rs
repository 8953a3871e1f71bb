//! Factory for creating leaderboard stores.

use std::sync::Arc;

use tracing::info;

use bumpboard_core::config::{StoreConfig, StoreProvider};
use bumpboard_core::error::{BumpError, BumpResult};
use bumpboard_core::health::PoolErrorReporter;
use bumpboard_core::traits::LeaderboardStore;

/// Factory for creating leaderboard stores.
pub struct StoreFactory;

impl StoreFactory {
    /// Create a store from the given configuration.
    ///
    /// `reporter` receives pool errors from pooled backends.
    #[cfg_attr(not(feature = "postgres"), allow(unused_variables))]
    pub async fn create(
        config: &StoreConfig,
        reporter: Option<PoolErrorReporter>,
    ) -> BumpResult<Arc<dyn LeaderboardStore>> {
        config.validate()?;

        match config.provider {
            #[cfg(feature = "postgres")]
            StoreProvider::Postgres => {
                let store = crate::postgres::PostgresLeaderboardStore::new(config, reporter)?;
                info!(
                    url = %config.redacted_connection_string(),
                    table = %config.schema.table,
                    "Using PostgreSQL leaderboard store"
                );
                Ok(Arc::new(store))
            }

            #[cfg(feature = "sqlite")]
            StoreProvider::Sqlite => {
                let path = config.sqlite_path();
                let store =
                    crate::sqlite::SqliteLeaderboardStore::new(&path, config.schema.clone())?;
                info!(
                    path = %path.display(),
                    table = %config.schema.table,
                    "Using SQLite leaderboard store"
                );
                Ok(Arc::new(store))
            }

            #[allow(unreachable_patterns)]
            other => Err(BumpError::Configuration(format!(
                "Store provider '{}' is not enabled in this build (enable the '{}' feature)",
                other, other
            ))),
        }
    }

    /// In-memory SQLite store with the default table layout.
    #[cfg(feature = "sqlite")]
    pub async fn in_memory() -> BumpResult<Arc<dyn LeaderboardStore>> {
        Self::create(&StoreConfig::sqlite(":memory:"), None).await
    }
}
