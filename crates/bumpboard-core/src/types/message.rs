//! Inbound chat messages and the events extracted from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a place messages can be delivered (a channel, a thread).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A raw message as handed over by the chat transport.
///
/// Mentions arrive as two parallel sequences; `mentioned_display_names[i]`
/// names `mentioned_user_ids[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Identifier of the message author.
    pub author_id: String,
    /// Message text.
    #[serde(default)]
    pub text: String,
    /// Mentioned users, in mention order.
    #[serde(default)]
    pub mentioned_user_ids: Vec<String>,
    /// Display names parallel to `mentioned_user_ids`.
    #[serde(default)]
    pub mentioned_display_names: Vec<String>,
    /// Where the message was posted.
    pub source_location: Location,
}

impl InboundMessage {
    /// Create a message with no mentions.
    pub fn new(
        author_id: impl Into<String>,
        text: impl Into<String>,
        source_location: impl Into<Location>,
    ) -> Self {
        Self {
            author_id: author_id.into(),
            text: text.into(),
            mentioned_user_ids: Vec::new(),
            mentioned_display_names: Vec::new(),
            source_location: source_location.into(),
        }
    }

    /// Builder: append a mentioned user.
    pub fn with_mention(mut self, user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.mentioned_user_ids.push(user_id.into());
        self.mentioned_display_names.push(display_name.into());
        self
    }

    /// The first mentioned user and their display name.
    ///
    /// A missing display name falls back to the user id.
    pub fn first_mention(&self) -> Option<(&str, &str)> {
        let id = self.mentioned_user_ids.first()?;
        let name = self
            .mentioned_display_names
            .first()
            .map(String::as_str)
            .filter(|n| !n.is_empty())
            .unwrap_or(id.as_str());
        Some((id.as_str(), name))
    }
}

/// A recognized bump confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpEvent {
    /// User whose counter is incremented.
    pub credited_user_id: String,
    /// Latest display name for that user.
    pub credited_display_name: String,
}
