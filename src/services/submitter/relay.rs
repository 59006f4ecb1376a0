use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::ACCEPT;

use super::{BookingPayload, BookingSubmitter, SubmitError};

/// Posts bookings to a form-relay endpoint as JSON.
pub struct FormRelaySubmitter {
    endpoint: String,
    client: reqwest::Client,
}

impl FormRelaySubmitter {
    pub fn new(endpoint: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("failed to build relay HTTP client")?;
        Ok(Self { endpoint, client })
    }
}

#[async_trait]
impl BookingSubmitter for FormRelaySubmitter {
    async fn deliver(&self, payload: &BookingPayload) -> Result<(), SubmitError> {
        if self.endpoint.is_empty() {
            return Err(SubmitError::NotConfigured);
        }

        let resp = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "booking relay returned an error");
            return Err(SubmitError::Rejected(status.as_u16()));
        }

        Ok(())
    }
}
