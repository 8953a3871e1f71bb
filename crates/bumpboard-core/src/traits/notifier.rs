//! Outbound notice delivery.

use async_trait::async_trait;

use crate::error::BumpResult;
use crate::types::{Location, Notice};

/// Delivers structured notices to a location on the chat network.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, location: &Location, notice: &Notice) -> BumpResult<()>;
}
