//! Notice content and notifier implementations.

mod log;
#[cfg(any(test, feature = "test-util"))]
mod memory;
pub mod notices;
mod stdout;
mod webhook;

pub use log::LogNotifier;
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryNotifier;
pub use stdout::StdoutNotifier;
pub use webhook::WebhookNotifier;

use std::sync::Arc;

use crate::config::NotifierConfig;
use crate::error::BumpResult;
use crate::traits::Notifier;

/// Create a notifier from configuration.
pub fn create_notifier(config: &NotifierConfig) -> BumpResult<Arc<dyn Notifier>> {
    Ok(match config {
        NotifierConfig::Log => Arc::new(LogNotifier),
        NotifierConfig::Stdout => Arc::new(StdoutNotifier::new()),
        NotifierConfig::Webhook {
            url,
            secret,
            timeout_secs,
        } => Arc::new(WebhookNotifier::new(url, secret.clone(), *timeout_secs)?),
    })
}
