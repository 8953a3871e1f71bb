//! Webhook delivery with retry and signature
//!
//! Posts notices as embed payloads to an HTTP endpoint with:
//! - Optional HMAC-SHA256 payload signing
//! - Exponential backoff retry on network errors and 5xx responses
//! - No retry on 4xx responses

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Serialize;
use sha2::Sha256;

use crate::error::{BumpError, BumpResult};
use crate::retry::{retry_transient, RetryPolicy};
use crate::traits::Notifier;
use crate::types::{Location, Notice};

#[derive(Serialize)]
struct EmbedFooter<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct EmbedField<'a> {
    name: &'a str,
    value: &'a str,
    inline: bool,
}

#[derive(Serialize)]
struct Embed<'a> {
    title: &'a str,
    description: &'a str,
    color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<EmbedFooter<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<EmbedField<'a>>,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    location: &'a str,
    embeds: [Embed<'a>; 1],
}

impl<'a> WebhookPayload<'a> {
    fn new(location: &'a Location, notice: &'a Notice) -> Self {
        Self {
            location: location.as_str(),
            embeds: [Embed {
                title: &notice.title,
                description: &notice.body,
                color: notice.accent.rgb(),
                footer: notice.footer.as_deref().map(|text| EmbedFooter { text }),
                fields: notice
                    .fields
                    .iter()
                    .map(|f| EmbedField {
                        name: &f.name,
                        value: &f.value,
                        inline: false,
                    })
                    .collect(),
            }],
        }
    }
}

/// Webhook notice delivery
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    secret: Option<String>,
    retry_policy: RetryPolicy,
}

impl WebhookNotifier {
    /// Create a new webhook notifier
    pub fn new(url: impl Into<String>, secret: Option<String>, timeout_secs: u64) -> BumpResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BumpError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            secret,
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Builder: set retry policy
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sign payload with HMAC-SHA256
    fn sign_payload(&self, payload: &str) -> Option<String> {
        let secret = self.secret.as_ref()?;
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(payload.as_bytes());
        Some(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
    }

    async fn deliver_once(&self, payload: &str, signature: Option<&str>) -> BumpResult<()> {
        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(payload.to_string());
        if let Some(signature) = signature {
            request = request.header("X-Bumpboard-Signature", signature);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BumpError::notify_transient(format!("Network error: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.is_server_error() || status.as_u16() == 429 {
            Err(BumpError::notify_transient(format!("Server error: {}", status)))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(BumpError::notify_rejected(format!(
                "Client error {}: {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, location: &Location, notice: &Notice) -> BumpResult<()> {
        let payload = serde_json::to_string(&WebhookPayload::new(location, notice))?;
        let signature = self.sign_payload(&payload);

        retry_transient(&self.retry_policy, "webhook delivery", || {
            self.deliver_once(&payload, signature.as_deref())
        })
        .await
    }
}
