//! Core traits for bumpboard collaborators.

mod leaderboard_store;
mod notifier;

pub use leaderboard_store::*;
pub use notifier::*;
