//! Recognizes bump confirmations posted by the moderation bot.
//!
//! Classification is pure: no I/O, no logging, and the same message always
//! yields the same answer.

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::config::ClassifierConfig;
use crate::types::{BumpEvent, InboundMessage};

/// Why a message did not qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// Author is not the trusted bot.
    UntrustedAuthor,
    /// Text does not contain the confirmation phrase.
    PhraseMissing,
    /// Nobody was mentioned, so there is nobody to credit.
    NoMention,
}

/// Outcome of classifying one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Qualifying(BumpEvent),
    Skipped(SkipReason),
}

impl Classification {
    /// The extracted event, if the message qualified.
    pub fn into_event(self) -> Option<BumpEvent> {
        match self {
            Classification::Qualifying(event) => Some(event),
            Classification::Skipped(_) => None,
        }
    }
}

/// Classifier for bump confirmation messages.
#[derive(Debug, Clone)]
pub struct BumpClassifier {
    trusted_bot_id: String,
    confirmation_phrase: String,
}

impl BumpClassifier {
    pub fn new(trusted_bot_id: impl Into<String>, confirmation_phrase: impl Into<String>) -> Self {
        Self {
            trusted_bot_id: trusted_bot_id.into(),
            confirmation_phrase: confirmation_phrase.into(),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(&config.trusted_bot_id, &config.confirmation_phrase)
    }

    /// Classify a message, keeping the skip reason.
    ///
    /// Rules apply in order: trusted author, phrase contained anywhere in the
    /// text, at least one mention. The first mentioned user is credited.
    pub fn classify_detailed(&self, message: &InboundMessage) -> Classification {
        if message.author_id != self.trusted_bot_id {
            return Classification::Skipped(SkipReason::UntrustedAuthor);
        }
        if !message.text.contains(self.confirmation_phrase.as_str()) {
            return Classification::Skipped(SkipReason::PhraseMissing);
        }
        match message.first_mention() {
            Some((user_id, display_name)) => Classification::Qualifying(BumpEvent {
                credited_user_id: user_id.to_string(),
                credited_display_name: display_name.to_string(),
            }),
            None => Classification::Skipped(SkipReason::NoMention),
        }
    }

    /// Classify a message.
    pub fn classify(&self, message: &InboundMessage) -> Option<BumpEvent> {
        self.classify_detailed(message).into_event()
    }
}
