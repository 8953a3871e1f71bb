//! bumpboard-core - Core library for bumpboard.
//!
//! This crate provides the types, traits, classifier, reminder scheduler and
//! pipeline coordinator for the bump leaderboard bot.
//!
//! # Example
//!
//! ```ignore
//! use bumpboard_core::{BumpClassifier, BumpCoordinator, BumpRuntime, CoordinatorConfig};
//!
//! let mut runtime = BumpRuntime::new(runtime_config, store.clone(), notifier.clone(), None).await?;
//! runtime.start().await?;
//!
//! let coordinator = BumpCoordinator::new(
//!     BumpClassifier::from_config(&config.classifier),
//!     store,
//!     runtime.reminders(),
//!     notifier,
//!     CoordinatorConfig::from(&config),
//! );
//! let outcome = coordinator.handle_message(&message).await;
//! ```

pub mod classifier;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod health;
pub mod notify;
pub mod reminders;
pub mod retry;
pub mod runtime;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use classifier::{BumpClassifier, Classification, SkipReason};
pub use config::{
    BumpboardConfig, LeaderboardSchema, NotifierConfig, PoolConfig, ReminderConfig,
    ReminderProfile, StoreConfig, StoreProvider, TableVariant,
};
pub use coordinator::{
    BumpCoordinator, CoordinatorConfig, LeaderboardView, MessageOutcome, ReminderOutcome,
    StoreOutcome,
};
pub use error::{BumpError, BumpResult, ErrorCode};
pub use health::{error_channel, HealthMonitor, PoolErrorReporter, PoolErrorReports};
pub use reminders::{PendingReminder, ReminderDispatcher, ReminderScheduler};
pub use retry::RetryPolicy;
pub use runtime::{BumpRuntime, RuntimeConfig};
pub use traits::{LeaderboardStore, Notifier};
pub use types::{
    Accent, BumpEvent, BumpRecord, InboundMessage, LeaderboardEntry, Location, Notice,
    NoticeField,
};
