//! Mail delivery backends.
//!
//! `HttpMailer` posts to an HTTP mail API (key held in `secrecy`).
//! `LogMailer` only logs; it backs local development, tests, and the
//! mail-disabled configuration.

use async_trait::async_trait;
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, Secret};
use serde_json::json;
use tracing::info;

use super::{Mailer, Notification};

/// Delivery via an HTTP mail API.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Secret<String>,
    from_address: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: String, from_address: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build mail HTTP client")?;
        Ok(Self {
            client,
            api_url,
            api_key: Secret::new(api_key),
            from_address,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let payload = json!({
            "from": self.from_address,
            "to": notification.to,
            "subject": notification.subject,
            "text": notification.body,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .context("Mail API request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Mail API returned {}", response.status());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Log-only backend used when mail is disabled.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, notification: &Notification) -> Result<()> {
        info!(
            to = %notification.to,
            subject = %notification.subject,
            "[mail disabled] Would send email"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
