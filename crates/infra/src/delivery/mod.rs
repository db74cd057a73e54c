use std::time::Duration;

/// The single outbound capability the scheduler depends on: push a text
/// message to an opaque destination. No retries or delivery guarantees are
/// assumed beyond the immediate attempt.
#[async_trait::async_trait]
pub trait IDeliverySink: Send + Sync {
    async fn deliver(&self, destination: &str, message: &str) -> anyhow::Result<()>;
}

/// Production sink that posts fired reminders to a configured webhook,
/// typically a chat gateway bridge.
pub struct WebhookDeliverySink {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl WebhookDeliverySink {
    pub fn new(url: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl IDeliverySink for WebhookDeliverySink {
    async fn deliver(&self, destination: &str, message: &str) -> anyhow::Result<()> {
        let res = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&serde_json::json!({
                "destination": destination,
                "message": message,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            anyhow::bail!("Delivery webhook returned status: {}", res.status());
        }
        Ok(())
    }
}
