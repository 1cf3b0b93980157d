use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Books an appointment one day from now and returns it as JSON.
    pub async fn create_appointment(&self, token: &str, description: &str) -> Result<Value> {
        let datetime = (chrono::Utc::now() + chrono::Duration::days(1)).to_rfc3339();
        let url = format!("{}/api/appointments", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({
                "datetime": datetime,
                "description": description,
            }))
            .send()
            .await
            .context("Failed to create appointment")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Failed to create appointment: {} - Response: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse appointment response")
    }

    pub async fn update_status(
        &self,
        admin_token: &str,
        appointment_id: &str,
        status: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/api/admin/appointments/{}/status",
            self.base_url, appointment_id
        );

        let response = self
            .client
            .patch(&url)
            .bearer_auth(admin_token)
            .json(&json!({ "status": status }))
            .send()
            .await
            .context("Failed to update appointment status")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to update status: {}", response.status());
        }
        Ok(())
    }

    pub async fn delete_appointment(&self, token: &str, appointment_id: &str) -> Result<()> {
        let url = format!("{}/api/appointments/{}", self.base_url, appointment_id);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to delete appointment")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to delete appointment: {}", response.status());
        }
        Ok(())
    }
}
