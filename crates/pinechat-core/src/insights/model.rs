//! Insights value objects and fetch state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Free-text analysis of a merchant's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessInsights {
    pub insights: String,
}

/// Headline card metrics for one merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantInsights {
    pub total_transactions: f64,
    pub total_refund_amount: f64,
    pub average_settlement_amount: f64,
    /// Fraction in `[0, 1]`.
    pub success_rate: f64,
}

/// Week-over-week aggregate feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyInsights {
    pub total_transactions: f64,
    pub transaction_change: f64,
    pub total_revenue: f64,
    pub revenue_change: f64,
    pub active_customers: f64,
    pub customer_change: f64,
    pub failure_rate: f64,
    pub failure_change: f64,
    pub top_payment_method: String,
    pub average_ticket: f64,
}

/// The backend reads the insights layer knows about.
///
/// Together with a merchant name this forms the cache key of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightsEndpoint {
    /// POST, merchant in the body
    BusinessInsights,
    /// POST, merchant in the body
    CardInsights,
    /// GET
    WeeklyInsights,
    /// GET
    BusinessInsightsFeed,
}

impl InsightsEndpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusinessInsights => "business_insights",
            Self::CardInsights => "card_insights",
            Self::WeeklyInsights => "weekly_insights",
            Self::BusinessInsightsFeed => "business_insights_feed",
        }
    }

    /// Whether the endpoint takes the merchant in a POST body.
    pub fn is_merchant_scoped(&self) -> bool {
        matches!(self, Self::BusinessInsights | Self::CardInsights)
    }
}

impl fmt::Display for InsightsEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one cached query: `Idle -> Loading -> Success | Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> FetchState<T> {
    /// Idle or loading: no outcome yet.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Idle | Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchState<U> {
        match self {
            Self::Idle => FetchState::Idle,
            Self::Loading => FetchState::Loading,
            Self::Success(data) => FetchState::Success(f(data)),
            Self::Error(message) => FetchState::Error(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merchant_insights_reads_camel_case() {
        let json = r#"{
            "totalTransactions": 1200,
            "totalRefundAmount": 3400.5,
            "averageSettlementAmount": 812.25,
            "successRate": 0.927
        }"#;

        let insights: MerchantInsights = serde_json::from_str(json).unwrap();
        assert_eq!(insights.total_transactions, 1200.0);
        assert_eq!(insights.success_rate, 0.927);
    }

    #[test]
    fn test_weekly_insights_reads_camel_case() {
        let json = r#"{
            "totalTransactions": 10, "transactionChange": 1.5,
            "totalRevenue": 2000, "revenueChange": -3,
            "activeCustomers": 40, "customerChange": 2,
            "failureRate": 0.02, "failureChange": 0.1,
            "topPaymentMethod": "UPI", "averageTicket": 200
        }"#;

        let weekly: WeeklyInsights = serde_json::from_str(json).unwrap();
        assert_eq!(weekly.top_payment_method, "UPI");
        assert_eq!(weekly.revenue_change, -3.0);
    }

    #[test]
    fn test_fetch_state_accessors() {
        let ok: FetchState<u32> = FetchState::Success(3);
        assert_eq!(ok.data(), Some(&3));
        assert!(!ok.is_pending());

        let failed: FetchState<u32> = FetchState::Error("boom".into());
        assert_eq!(failed.error(), Some("boom"));
        assert!(FetchState::<u32>::Idle.is_pending());
        assert_eq!(ok.map(|n| n * 2), FetchState::Success(6));
    }
}
