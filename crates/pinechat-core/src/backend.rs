//! Backend service traits.
//!
//! The chat session and the insights service only see these traits; the
//! HTTP implementation lives in `pinechat-interaction`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::insights::{BusinessInsights, MerchantInsights, WeeklyInsights};

/// Body of a question-answering request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub merchant: String,
}

/// Body of a question-answering reply. Both fields may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// Question-answering backend.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Sends one question in the context of a merchant.
    async fn ask(&self, request: &QueryRequest) -> Result<QueryAnswer>;
}

/// Read-only insights backend.
#[async_trait]
pub trait InsightsBackend: Send + Sync {
    async fn business_insights(&self, merchant: &str) -> Result<BusinessInsights>;

    async fn card_insights(&self, merchant: &str) -> Result<MerchantInsights>;

    async fn weekly_insights(&self) -> Result<WeeklyInsights>;

    /// Business insights feed, not scoped to a merchant.
    async fn business_insights_feed(&self) -> Result<BusinessInsights>;
}
