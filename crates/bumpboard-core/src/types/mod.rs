//! Core types for bumpboard.

mod message;
mod notice;
mod record;

pub use message::*;
pub use notice::*;
pub use record::*;
