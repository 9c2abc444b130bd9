//! HttpBackend - reqwest client for the assistant and insights endpoints.
//!
//! All endpoints exchange JSON. A response counts as a failure when the
//! transport fails, the status is not 2xx, or the body is empty.

use async_trait::async_trait;
use pinechat_core::backend::{AssistantBackend, InsightsBackend, QueryAnswer, QueryRequest};
use pinechat_core::config::{AppConfig, EndpointsConfig};
use pinechat_core::insights::{BusinessInsights, MerchantInsights, WeeklyInsights};
use pinechat_core::{PinechatError, Result};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct MerchantRequest<'a> {
    merchant: &'a str,
}

/// Backend client bound to one base URL.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    endpoints: EndpointsConfig,
    timeout: Duration,
}

impl HttpBackend {
    /// Creates a client for `base_url` with the default endpoint paths.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoints: EndpointsConfig::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.backend.base_url.clone())
            .with_endpoints(config.endpoints.clone())
            .with_timeout(config.backend.timeout())
    }

    pub fn with_endpoints(mut self, endpoints: EndpointsConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .json(body);
        self.execute(path, request).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.client.get(self.url(path));
        self.execute(path, request).await
    }

    async fn execute<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<T> {
        tracing::debug!(endpoint = path, "Sending backend request");

        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PinechatError::network(format!("Request to {} failed: {}", path, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PinechatError::network(format!("Failed to read response from {}: {}", path, e)))?;

        if !status.is_success() {
            tracing::warn!(endpoint = path, status = status.as_u16(), "Backend returned error status");
            return Err(PinechatError::status(status.as_u16(), text));
        }

        decode_body(path, &text)
    }
}

/// Parses a success body, treating whitespace-only and `null` bodies as empty.
fn decode_body<T: DeserializeOwned>(path: &str, text: &str) -> Result<T> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(PinechatError::empty_payload(path));
    }
    Ok(serde_json::from_str(trimmed)?)
}

#[async_trait]
impl AssistantBackend for HttpBackend {
    async fn ask(&self, request: &QueryRequest) -> Result<QueryAnswer> {
        self.post_json(&self.endpoints.query, request).await
    }
}

#[async_trait]
impl InsightsBackend for HttpBackend {
    async fn business_insights(&self, merchant: &str) -> Result<BusinessInsights> {
        self.post_json(&self.endpoints.business_insights, &MerchantRequest { merchant })
            .await
    }

    async fn card_insights(&self, merchant: &str) -> Result<MerchantInsights> {
        self.post_json(&self.endpoints.card_insights, &MerchantRequest { merchant })
            .await
    }

    async fn weekly_insights(&self) -> Result<WeeklyInsights> {
        self.get_json(&self.endpoints.weekly_insights).await
    }

    async fn business_insights_feed(&self) -> Result<BusinessInsights> {
        self.get_json(&self.endpoints.business_insights_get).await
    }
}
