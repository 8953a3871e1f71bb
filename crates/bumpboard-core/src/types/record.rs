//! Persisted counters and leaderboard rows.

use serde::{Deserialize, Serialize};

/// A user's bump counter as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpRecord {
    /// Primary key, immutable once created.
    pub user_id: String,
    /// Most recently observed display name.
    pub display_name: String,
    /// Number of committed bumps.
    pub count: u64,
}

/// One row of the ranked leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub count: u64,
}

impl LeaderboardEntry {
    pub fn new(display_name: impl Into<String>, count: u64) -> Self {
        Self {
            display_name: display_name.into(),
            count,
        }
    }
}

impl From<BumpRecord> for LeaderboardEntry {
    fn from(record: BumpRecord) -> Self {
        Self {
            display_name: record.display_name,
            count: record.count,
        }
    }
}
