//! HTTP webhook delivery.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use tracing::{debug, info};

use super::error::{NotificationError, NotificationResult};
use super::ReportSender;
use crate::callback::report::Report;
use crate::config::ReporterConfig;

/// Longest response body quoted in an error.
const MAX_BODY_IN_ERROR: usize = 200;

/// Sends reports as a JSON POST to a fixed URL.
#[derive(Debug)]
pub struct WebhookSender {
    url: String,
    api_token: Option<String>,
    client: Client,
}

impl WebhookSender {
    /// Creates a sender for `url` with the given request timeout.
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        api_token: Option<String>,
    ) -> NotificationResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(NotificationError::config("webhook URL is empty"));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            NotificationError::config(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            url,
            api_token,
            client,
        })
    }

    /// Creates a sender from reporter configuration.
    ///
    /// Fails with [`NotificationError::NotConfigured`] when no URL is set.
    pub fn from_config(config: &ReporterConfig) -> NotificationResult<Self> {
        let url = config
            .api_url
            .as_deref()
            .ok_or_else(|| NotificationError::not_configured("Webhook"))?;
        Self::new(url, config.timeout(), config.api_token.clone())
    }

    /// Destination URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ReportSender for WebhookSender {
    fn name(&self) -> &str {
        "Webhook"
    }

    fn send(&self, report: &Report) -> NotificationResult<()> {
        let body = serde_json::to_vec(report)?;

        debug!(
            "Posting report for play {} ({} bytes) to {}",
            report.play_id,
            body.len(),
            self.url
        );

        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, user_agent());

        if let Some(ref token) = self.api_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.body(body).send()?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(NotificationError::http(
                status.as_u16(),
                truncate(&text, MAX_BODY_IN_ERROR),
            ));
        }

        info!("Report delivered to {} ({})", self.url, status);
        Ok(())
    }
}

fn user_agent() -> String {
    format!("playreport/{}", crate::VERSION)
}

/// Truncates a string to at most `max_len` bytes, on a char boundary.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
