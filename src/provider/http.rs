use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::provider::{
    CatalogProvider, ProviderCategory, ProviderError, ProviderProduct, TicketItem,
};

/// Default bound for any single provider call. A hung provider fails the
/// request instead of blocking the worker indefinitely.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the point-of-sale HTTP API
#[derive(Debug, Clone)]
pub struct PosClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl PosClientConfig {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// HTTP client for the point-of-sale provider
pub struct PosClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct TicketCreated {
    ticket_id: String,
}

impl PosClient {
    /// Build a client with the configured per-request timeout applied to
    /// every call.
    pub fn new(config: PosClientConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ProviderError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        Ok(response.json::<T>().await?)
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        Ok(response)
    }
}

#[async_trait]
impl CatalogProvider for PosClient {
    async fn fetch_categories(&self) -> Result<Vec<ProviderCategory>, ProviderError> {
        tracing::debug!("Fetching category snapshot from provider");
        self.get_json("/catalog/categories").await
    }

    async fn fetch_products(&self) -> Result<Vec<ProviderProduct>, ProviderError> {
        tracing::debug!("Fetching product snapshot from provider");
        self.get_json("/catalog/products").await
    }

    async fn fetch_product_image(
        &self,
        provider_id: &str,
    ) -> Result<Option<String>, ProviderError> {
        #[derive(Deserialize)]
        struct ImageRef {
            image_url: Option<String>,
        }

        let image: ImageRef = self
            .get_json(&format!("/catalog/products/{}/image", provider_id))
            .await?;
        Ok(image.image_url)
    }

    async fn create_ticket(&self, room_number: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({ "room_number": room_number });
        let response = self.post_json("/tickets", &body).await?;
        let created = response.json::<TicketCreated>().await?;

        tracing::info!(
            "Provider opened ticket {} for room {}",
            created.ticket_id,
            room_number
        );
        Ok(created.ticket_id)
    }

    async fn append_ticket_items(
        &self,
        external_ticket_id: &str,
        items: &[TicketItem],
    ) -> Result<(), ProviderError> {
        let body = serde_json::json!({ "items": items });
        self.post_json(&format!("/tickets/{}/items", external_ticket_id), &body)
            .await?;

        tracing::debug!(
            "Appended {} line(s) to provider ticket {}",
            items.len(),
            external_ticket_id
        );
        Ok(())
    }

    async fn close_ticket(&self, external_ticket_id: &str) -> Result<(), ProviderError> {
        let body = serde_json::json!({});
        self.post_json(&format!("/tickets/{}/close", external_ticket_id), &body)
            .await?;

        tracing::info!("Provider closed ticket {}", external_ticket_id);
        Ok(())
    }
}
