//! bumpboard-stores - Leaderboard store implementations for bumpboard.
//!
//! # Supported Backends
//!
//! - **PostgreSQL** (feature: `postgres`) - pooled via deadpool-postgres, for production
//! - **SQLite** (feature: `sqlite`) - rusqlite, for local runs and tests

mod factory;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "sqlite")]
mod sqlite;

mod sql;

pub use factory::StoreFactory;

#[cfg(feature = "postgres")]
pub use postgres::PostgresLeaderboardStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteLeaderboardStore;
