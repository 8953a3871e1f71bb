use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::BumpResult;
use crate::traits::Notifier;
use crate::types::{Location, Notice};

/// Keeps every delivered notice in memory, in delivery order.
///
/// Available to other crates through the `test-util` feature.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    delivered: Mutex<Vec<(Location, Notice)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of delivered notices.
    pub async fn delivered(&self) -> Vec<(Location, Notice)> {
        self.delivered.lock().await.clone()
    }

    /// Notices delivered with the given title.
    pub async fn with_title(&self, title: &str) -> Vec<(Location, Notice)> {
        self.delivered
            .lock()
            .await
            .iter()
            .filter(|(_, n)| n.title == title)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, location: &Location, notice: &Notice) -> BumpResult<()> {
        self.delivered
            .lock()
            .await
            .push((location.clone(), notice.clone()));
        Ok(())
    }
}
