use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use formsite_core::config::LeadsConfig;
use formsite_core::domain::lead::LeadSubmission;
use formsite_core::errors::PipelineError;

/// REST adapter for the hosted `leads` table.
///
/// Inserts exactly one record per call, asking the service to echo the row
/// back so the server-assigned id can be returned. Resubmitting the same
/// lead inserts a second, distinct record.
#[derive(Clone)]
pub struct LeadStore {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl LeadStore {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self { http, base_url: base_url.into(), api_key }
    }

    /// Builds a store from the loaded configuration, naming the first
    /// absent credential.
    pub fn from_config(http: reqwest::Client, config: &LeadsConfig) -> Result<Self, PipelineError> {
        let (url, key) = config.require_credentials()?;
        Ok(Self::new(http, url, key.clone()))
    }

    /// Inserts one lead record and returns its server-assigned id.
    pub async fn insert(&self, lead: &LeadSubmission) -> Result<String> {
        let url = format!("{}/rest/v1/leads", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
            .header("Prefer", "return=representation")
            .json(&[lead.record()])
            .send()
            .await
            .context("lead insert request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("storage service returned {status}: {body}"));
        }

        let rows: Vec<Value> =
            response.json().await.context("failed to decode insert response")?;
        let id = rows
            .first()
            .and_then(|row| row.get("id"))
            .ok_or_else(|| anyhow!("insert response carried no assigned id"))?;

        let lead_id = match id {
            Value::String(id) => id.clone(),
            Value::Number(id) => id.to_string(),
            other => return Err(anyhow!("unexpected id shape in insert response: {other}")),
        };

        debug!(lead_id = %lead_id, "lead record inserted");
        Ok(lead_id)
    }
}
