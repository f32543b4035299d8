//! HTTP adapters for the capability and pricing services

use advisor_lib::catalog::CapabilityBackend;
use advisor_lib::models::ProfileCapabilities;
use advisor_lib::pricing::{PriceEntry, PricingBackend};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

/// Thin HTTP client shared by the backend adapters
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }
}

#[derive(Debug, Deserialize)]
struct CapabilityListResponse {
    profiles: Vec<ProfileCapabilities>,
}

#[derive(Debug, Deserialize)]
struct PriceListResponse {
    items: Vec<PriceEntry>,
}

/// Capability service adapter
pub struct HttpCapabilityBackend {
    client: ApiClient,
}

impl HttpCapabilityBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(base_url)?,
        })
    }
}

#[async_trait]
impl CapabilityBackend for HttpCapabilityBackend {
    async fn list_capabilities(&self, region: &str) -> Result<Vec<ProfileCapabilities>> {
        let path = format!("api/v1/capabilities/{}", region);
        let response: CapabilityListResponse = self
            .client
            .get(&path)
            .await
            .with_context(|| format!("Capability listing for region {} failed", region))?;
        Ok(response.profiles)
    }
}

/// Pricing service adapter
pub struct HttpPricingBackend {
    client: ApiClient,
}

impl HttpPricingBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(base_url)?,
        })
    }
}

#[async_trait]
impl PricingBackend for HttpPricingBackend {
    async fn query(&self, profile_id: &str, region: &str) -> Result<Vec<PriceEntry>> {
        let path = format!("api/v1/prices?profile={}&region={}", profile_id, region);
        let response: PriceListResponse = self
            .client
            .get(&path)
            .await
            .with_context(|| format!("Price query for {} in {} failed", profile_id, region))?;
        Ok(response.items)
    }
}
