//! API client for communicating with the Cost Explorer API

use anyhow::{Context, Result};
use explorer_lib::{CostReport, PricingRate, Summary};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for the Cost Explorer API
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

    /// Make a GET request with query parameters
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        self.send(self.client.get(url).query(query)).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        self.send(self.client.put(url).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            anyhow::bail!("API error ({}): {}", status, message);
        }

        response.json().await.context("Failed to parse response")
    }

    pub async fn hosts(&self, query: &HostQuery) -> Result<CostReport> {
        self.get("api/v1/hosts", &query.params()).await
    }

    pub async fn summary(&self, query: &HostQuery) -> Result<SummaryResponse> {
        self.get("api/v1/summary", &query.params()).await
    }

    pub async fn pricing(&self) -> Result<PricingRate> {
        self.get("api/v1/pricing", &[]).await
    }

    pub async fn update_pricing(&self, request: &PricingUpdateRequest) -> Result<PricingUpdateResponse> {
        self.put("api/v1/pricing", request).await
    }
}

/// Host filters, sort and page shared by the listing and summary commands
#[derive(Debug, Clone, Default)]
pub struct HostQuery {
    pub name: Option<String>,
    pub group_ids: Vec<String>,
    pub show_inactive: bool,
    pub sort: Option<String>,
    pub descending: bool,
    pub page: Option<usize>,
}

impl HostQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(name) = &self.name {
            params.push(("name", name.clone()));
        }
        if !self.group_ids.is_empty() {
            params.push(("groupids", self.group_ids.join(",")));
        }
        if self.show_inactive {
            params.push(("show_inactive", "1".to_string()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort", sort.clone()));
        }
        if self.descending {
            params.push(("sortorder", "DESC".to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        params
    }
}

// API request and response types

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: Summary,
    pub pricing: PricingRate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingUpdateRequest {
    pub per_cpu_core: f64,
    pub per_memory_gb: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingUpdateResponse {
    pub messages: Vec<String>,
    pub pricing: PricingRate,
}
