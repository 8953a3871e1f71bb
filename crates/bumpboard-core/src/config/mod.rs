//! Configuration system for bumpboard.

mod store;

pub use store::*;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use strum::{Display, EnumString};

use crate::error::{BumpError, BumpResult};

/// Which bump confirmations count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Author id of the moderation bot whose confirmations are trusted.
    pub trusted_bot_id: String,
    /// Phrase that must appear somewhere in the confirmation text.
    pub confirmation_phrase: String,
}

/// Which configured delay arms the follow-up reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReminderProfile {
    /// Short follow-up after the thank-you notice.
    #[default]
    ThankYou,
    /// Wait out the full bump cooldown.
    BumpCycle,
}

/// Acknowledgment and reminder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub thank_you_delay_secs: u64,
    pub bump_cycle_delay_secs: u64,
    pub profile: ReminderProfile,
    /// Send a thank-you notice right after each recorded bump.
    pub acknowledge: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            thank_you_delay_secs: 300,
            bump_cycle_delay_secs: 7200,
            profile: ReminderProfile::ThankYou,
            acknowledge: true,
        }
    }
}

impl ReminderConfig {
    /// Delay for the active profile.
    pub fn delay(&self) -> Duration {
        match self.profile {
            ReminderProfile::ThankYou => Duration::from_secs(self.thank_you_delay_secs),
            ReminderProfile::BumpCycle => Duration::from_secs(self.bump_cycle_delay_secs),
        }
    }
}

/// Where notices are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NotifierConfig {
    /// Write notices to the log.
    #[default]
    Log,
    /// Print one JSON line per notice on stdout.
    Stdout,
    /// POST notices to an HTTP endpoint.
    Webhook {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        secret: Option<String>,
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
}

fn default_timeout() -> u64 {
    30
}

/// Main bumpboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BumpboardConfig {
    pub classifier: ClassifierConfig,
    pub reminders: ReminderConfig,
    /// Rows shown on the leaderboard.
    pub leaderboard_size: usize,
    /// Fixed location for acknowledgments and reminders, instead of the
    /// location the confirmation was posted in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_location: Option<String>,
    pub store: StoreConfig,
    pub notifier: NotifierConfig,
}

impl Default for BumpboardConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            reminders: ReminderConfig::default(),
            leaderboard_size: 10,
            notification_location: None,
            store: StoreConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl BumpboardConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> BumpResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| BumpError::Configuration(e.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| BumpError::Configuration(e.to_string()))
            }
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| BumpError::Configuration(e.to_string()))
            }
            _ => Err(BumpError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> BumpResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay environment variables onto this configuration.
    ///
    /// Reads:
    /// - `BUMPBOARD_TRUSTED_BOT_ID`, `BUMPBOARD_CONFIRMATION_PHRASE`
    /// - `BUMPBOARD_THANK_YOU_DELAY_SECS` (default: 300)
    /// - `BUMPBOARD_BUMP_CYCLE_DELAY_SECS` (default: 7200)
    /// - `BUMPBOARD_REMINDER_PROFILE` (`thank_you` | `bump_cycle`)
    /// - `BUMPBOARD_DISABLE_ACKNOWLEDGMENT`
    /// - `BUMPBOARD_LEADERBOARD_SIZE` (default: 10)
    /// - `BUMPBOARD_NOTIFY_LOCATION`
    /// - `BUMPBOARD_STORE_PROVIDER` (`postgres` | `sqlite`)
    /// - `DATABASE_URL`, falling back to `DATA_BASE`
    /// - `BUMPBOARD_TABLE_VARIANT` (`bump_leaderboard` | `bumps`)
    /// - `BUMPBOARD_WEBHOOK_URL`, `BUMPBOARD_WEBHOOK_SECRET`, `BUMPBOARD_STDOUT_NOTICES`
    pub fn apply_env(&mut self) -> BumpResult<()> {
        if let Ok(id) = std::env::var("BUMPBOARD_TRUSTED_BOT_ID") {
            self.classifier.trusted_bot_id = id;
        }
        if let Ok(phrase) = std::env::var("BUMPBOARD_CONFIRMATION_PHRASE") {
            self.classifier.confirmation_phrase = phrase;
        }

        if let Some(secs) = parse_env::<u64>("BUMPBOARD_THANK_YOU_DELAY_SECS")? {
            self.reminders.thank_you_delay_secs = secs;
        }
        if let Some(secs) = parse_env::<u64>("BUMPBOARD_BUMP_CYCLE_DELAY_SECS")? {
            self.reminders.bump_cycle_delay_secs = secs;
        }
        if let Some(profile) = parse_env::<ReminderProfile>("BUMPBOARD_REMINDER_PROFILE")? {
            self.reminders.profile = profile;
        }
        if std::env::var("BUMPBOARD_DISABLE_ACKNOWLEDGMENT").is_ok() {
            self.reminders.acknowledge = false;
        }

        if let Some(size) = parse_env::<usize>("BUMPBOARD_LEADERBOARD_SIZE")? {
            self.leaderboard_size = size;
        }
        if let Ok(location) = std::env::var("BUMPBOARD_NOTIFY_LOCATION") {
            self.notification_location = Some(location);
        }

        if let Some(provider) = parse_env::<StoreProvider>("BUMPBOARD_STORE_PROVIDER")? {
            self.store.provider = provider;
        }
        if let Ok(url) = std::env::var("DATABASE_URL").or_else(|_| std::env::var("DATA_BASE")) {
            self.store.connection_string = Some(url);
        }
        if let Some(variant) = parse_env::<TableVariant>("BUMPBOARD_TABLE_VARIANT")? {
            self.store.schema = LeaderboardSchema::for_variant(variant);
        }

        if let Ok(url) = std::env::var("BUMPBOARD_WEBHOOK_URL") {
            self.notifier = NotifierConfig::Webhook {
                url,
                secret: std::env::var("BUMPBOARD_WEBHOOK_SECRET").ok(),
                timeout_secs: default_timeout(),
            };
        } else if std::env::var("BUMPBOARD_STDOUT_NOTICES").is_ok() {
            self.notifier = NotifierConfig::Stdout;
        }

        Ok(())
    }

    /// Check required options and value ranges.
    pub fn validate(&self) -> BumpResult<()> {
        if self.classifier.trusted_bot_id.trim().is_empty() {
            return Err(BumpError::Configuration(
                "classifier.trusted_bot_id is required (set BUMPBOARD_TRUSTED_BOT_ID)".to_string(),
            ));
        }
        if self.classifier.confirmation_phrase.is_empty() {
            return Err(BumpError::Configuration(
                "classifier.confirmation_phrase is required (set BUMPBOARD_CONFIRMATION_PHRASE)"
                    .to_string(),
            ));
        }
        if self.leaderboard_size == 0 {
            return Err(BumpError::Configuration(
                "leaderboard_size must be at least 1".to_string(),
            ));
        }
        self.store.validate()
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> BumpboardConfigBuilder {
        BumpboardConfigBuilder::default()
    }
}

fn parse_env<T: FromStr>(key: &str) -> BumpResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| BumpError::Configuration(format!("{} has invalid value '{}': {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}

/// Builder for BumpboardConfig.
#[derive(Default)]
pub struct BumpboardConfigBuilder {
    config: BumpboardConfig,
}

impl BumpboardConfigBuilder {
    /// Set the trusted bot and its confirmation phrase.
    pub fn classifier(mut self, trusted_bot_id: impl Into<String>, phrase: impl Into<String>) -> Self {
        self.config.classifier = ClassifierConfig {
            trusted_bot_id: trusted_bot_id.into(),
            confirmation_phrase: phrase.into(),
        };
        self
    }

    /// Set reminder configuration.
    pub fn reminders(mut self, config: ReminderConfig) -> Self {
        self.config.reminders = config;
        self
    }

    /// Set leaderboard size.
    pub fn leaderboard_size(mut self, size: usize) -> Self {
        self.config.leaderboard_size = size;
        self
    }

    /// Route acknowledgments and reminders to a fixed location.
    pub fn notification_location(mut self, location: impl Into<String>) -> Self {
        self.config.notification_location = Some(location.into());
        self
    }

    /// Set store configuration.
    pub fn store(mut self, config: StoreConfig) -> Self {
        self.config.store = config;
        self
    }

    /// Set notifier configuration.
    pub fn notifier(mut self, config: NotifierConfig) -> Self {
        self.config.notifier = config;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> BumpboardConfig {
        self.config
    }
}
