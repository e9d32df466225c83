use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::registry::{Model, ModelFilter, NewModel, RegistryStats};
use crate::server::{ApiResponse, DeleteResponse, ModelListResponse};

/// Thin HTTP client for the registry API.
pub struct MarketClient {
    client: Client,
    base_url: String,
}

impl MarketClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<String> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .context("Error requesting health check")?;
        Ok(response.text().await?)
    }

    pub async fn list_models(&self, filter: &ModelFilter) -> Result<ModelListResponse> {
        let response = self
            .client
            .get(self.url("/models"))
            .query(filter)
            .send()
            .await
            .context("Error requesting models")?;
        decode(response).await
    }

    pub async fn get_model(&self, id: &str) -> Result<Model> {
        let response = self
            .client
            .get(self.url(&format!("/models/{}", id)))
            .send()
            .await
            .context("Error requesting model")?;
        decode(response).await
    }

    pub async fn create_model(&self, model: &NewModel) -> Result<Model> {
        let response = self
            .client
            .post(self.url("/models"))
            .json(model)
            .send()
            .await
            .context("Error sending create request")?;
        decode(response).await
    }

    pub async fn delete_model(&self, id: &str) -> Result<DeleteResponse> {
        let response = self
            .client
            .delete(self.url(&format!("/models/{}", id)))
            .send()
            .await
            .context("Error sending delete request")?;
        decode(response).await
    }

    pub async fn record_interaction(&self, id: &str) -> Result<Model> {
        let response = self
            .client
            .post(self.url(&format!("/models/{}/interactions", id)))
            .send()
            .await
            .context("Error sending interaction")?;
        decode(response).await
    }

    pub async fn stats(&self) -> Result<RegistryStats> {
        let response = self
            .client
            .get(self.url("/models/stats"))
            .send()
            .await
            .context("Error requesting statistics")?;
        decode(response).await
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.url("/categories"))
            .send()
            .await
            .context("Error requesting categories")?;
        decode(response).await
    }
}

/// Unwraps the API envelope, turning an error status into an `Err`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body: ApiResponse<T> = response
        .json()
        .await
        .with_context(|| format!("Failed to parse server response (HTTP {})", status))?;

    if !body.is_success() {
        bail!(body
            .message
            .unwrap_or_else(|| format!("Server returned HTTP {}", status)));
    }
    body.data
        .ok_or_else(|| anyhow!("Server response contained no data"))
}
