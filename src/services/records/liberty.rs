use anyhow::Context;
use async_trait::async_trait;

use super::RecordsProvider;
use crate::models::RefillOutcome;

/// HTTP client for the Liberty Software RXQ pharmacy records API.
pub struct LibertyRecords {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl LibertyRecords {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn parse_outcome(data: &serde_json::Value) -> anyhow::Result<RefillOutcome> {
        serde_json::from_value(data.clone())
            .with_context(|| format!("unexpected refill response shape: {data}"))
    }
}

#[async_trait]
impl RecordsProvider for LibertyRecords {
    async fn verify_identity(&self, name: &str, date_of_birth: &str) -> anyhow::Result<bool> {
        let resp = self
            .client
            .post(format!("{}/patients/verify", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "patientName": name,
                "patientDOB": date_of_birth,
            }))
            .send()
            .await
            .context("failed to call records API")?
            .error_for_status()
            .context("records API returned error")?;

        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse verification response")?;

        data["verified"]
            .as_bool()
            .ok_or_else(|| anyhow::anyhow!("missing 'verified' in records response"))
    }

    async fn submit_refill(
        &self,
        name: &str,
        date_of_birth: &str,
        rx_number: &str,
    ) -> anyhow::Result<RefillOutcome> {
        let resp = self
            .client
            .post(format!("{}/refills", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "rxNumber": rx_number,
                "patientName": name,
                "patientDOB": date_of_birth,
            }))
            .send()
            .await
            .context("failed to call records API")?
            .error_for_status()
            .context("records API returned error")?;

        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse refill response")?;

        Self::parse_outcome(&data)
    }
}
