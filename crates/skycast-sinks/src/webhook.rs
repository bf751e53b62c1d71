use anyhow::{anyhow, Result};
use reqwest::Client;
use skycast_core::{Alert, AlertSink};
use std::time::Duration;

/// POSTs each alert as JSON to a fixed URL
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: String) -> Result<Self> {
        if url.is_empty() {
            return Err(anyhow!("invalid webhook configuration"));
        }
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl AlertSink for WebhookSink {
    async fn notify(&mut self, alert: &Alert) -> Result<()> {
        let resp = self.client.post(&self.url).json(alert).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("webhook delivery failed: {} {}", status, text));
        }
        Ok(())
    }
}
