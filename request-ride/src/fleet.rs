use anyhow::Context;
use serde_json::Value;

/// Client for the fleet service that hands out unicorns.
#[derive(Clone, Debug)]
pub(crate) struct FleetClient {
    http: reqwest::Client,
    url: String,
}

impl FleetClient {
    pub(crate) fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Fetches a unicorn record. The body is returned as-is, whatever the status.
    pub(crate) async fn request_unicorn(&self) -> anyhow::Result<Value> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("failed to reach fleet service at {}", self.url))?;

        let unicorn = response
            .json::<Value>()
            .await
            .context("fleet service returned invalid JSON")?;

        Ok(unicorn)
    }
}
