//! Error types for bumpboard operations.
//!
//! Classification skips are not errors and never show up here; see
//! [`crate::classifier::SkipReason`]. Everything else that can go wrong in the
//! pipeline is a [`BumpError`] carrying a stable [`ErrorCode`].

use thiserror::Error;

/// Result type alias for bumpboard operations.
pub type BumpResult<T> = Result<T, BumpError>;

/// Main error type for all bumpboard operations.
#[derive(Error, Debug)]
pub enum BumpError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The leaderboard store could not service a request.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Schema initialization failed.
    #[error("Schema initialization failed: {message}")]
    SchemaInit {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A reminder could not be armed or the scheduler failed.
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Delivering a notice failed.
    #[error("Notify error: {message}")]
    Notify {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Configuration (CFG_xxx)
    CfgInvalid,

    // Store (STORE_xxx)
    StoreConnectionFailed,
    StoreOperationFailed,
    StoreSchemaFailed,

    // Scheduler (SCHED_xxx)
    SchedArmFailed,

    // Notify (NTF_xxx)
    NtfTransient,
    NtfRejected,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::CfgInvalid => "CFG_001",
            ErrorCode::StoreConnectionFailed => "STORE_001",
            ErrorCode::StoreOperationFailed => "STORE_002",
            ErrorCode::StoreSchemaFailed => "STORE_003",
            ErrorCode::SchedArmFailed => "SCHED_001",
            ErrorCode::NtfTransient => "NTF_001",
            ErrorCode::NtfRejected => "NTF_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl BumpError {
    /// Create a store error for a failed statement.
    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            code: ErrorCode::StoreOperationFailed,
            source: None,
        }
    }

    /// Create a store error for a failed statement, keeping the cause.
    pub fn store_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            code: ErrorCode::StoreOperationFailed,
            source: Some(Box::new(source)),
        }
    }

    /// Create a store error for a connection that could not be acquired.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            code: ErrorCode::StoreConnectionFailed,
            source: None,
        }
    }

    /// Create a schema initialization error.
    pub fn schema(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SchemaInit {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a scheduler error.
    pub fn scheduler(message: impl Into<String>) -> Self {
        Self::Scheduler(message.into())
    }

    /// Create a notify error that may succeed on retry.
    pub fn notify_transient(message: impl Into<String>) -> Self {
        Self::Notify {
            message: message.into(),
            code: ErrorCode::NtfTransient,
            source: None,
        }
    }

    /// Create a notify error the receiving side rejected outright.
    pub fn notify_rejected(message: impl Into<String>) -> Self {
        Self::Notify {
            message: message.into(),
            code: ErrorCode::NtfRejected,
            source: None,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Configuration(_) => ErrorCode::CfgInvalid,
            Self::StoreUnavailable { code, .. } => *code,
            Self::SchemaInit { .. } => ErrorCode::StoreSchemaFailed,
            Self::Scheduler(_) => ErrorCode::SchedArmFailed,
            Self::Notify { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether the failed operation never reached the backend and may be retried.
    ///
    /// A statement that reached the database is never transient: its commit
    /// state is unknown, and re-running an increment could count a bump twice.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::StoreConnectionFailed | ErrorCode::NtfTransient
        )
    }

    /// Whether this error means the store could not service the request.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. } | Self::SchemaInit { .. })
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Configuration(_) => Some("Please check BUMPBOARD_* environment variables or the config file"),
            Self::StoreUnavailable { .. } => Some("Please check DATABASE_URL and that the database is reachable"),
            Self::SchemaInit { .. } => Some("The table will be created on the next successful write attempt"),
            Self::Notify { .. } => Some("Please check the notifier configuration"),
            _ => None,
        }
    }
}
