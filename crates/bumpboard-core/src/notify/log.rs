use async_trait::async_trait;

use crate::error::BumpResult;
use crate::traits::Notifier;
use crate::types::{Location, Notice};

/// Writes notices to the log instead of a chat network.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, location: &Location, notice: &Notice) -> BumpResult<()> {
        tracing::info!(
            location = %location,
            title = %notice.title,
            accent = %notice.accent,
            "{}",
            notice.body
        );
        Ok(())
    }
}
