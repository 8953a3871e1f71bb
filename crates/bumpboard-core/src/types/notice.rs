//! Structured outbound content.
//!
//! A [`Notice`] carries what to say, never how it looks; rendering belongs to
//! whatever [`crate::traits::Notifier`] delivers it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Accent hint attached to a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Accent {
    /// Acknowledgments (#0099ff).
    Thanks,
    /// Reminders (#ff9900).
    Reminder,
    /// Leaderboards (#acf508).
    Leaderboard,
    /// Failure notices.
    Error,
}

impl Accent {
    /// RGB value of the accent.
    pub fn rgb(&self) -> u32 {
        match self {
            Accent::Thanks => 0x0099ff,
            Accent::Reminder => 0xff9900,
            Accent::Leaderboard => 0xacf508,
            Accent::Error => 0xed4245,
        }
    }
}

/// A titled name/value pair inside a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeField {
    pub name: String,
    pub value: String,
}

/// Content for one outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub accent: Accent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<NoticeField>,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>, accent: Accent) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            accent,
            footer: None,
            fields: Vec::new(),
        }
    }

    /// Builder: set the footer line.
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Builder: append a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(NoticeField {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}
