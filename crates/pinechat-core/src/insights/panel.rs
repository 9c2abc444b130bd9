//! The merchant insights panel.
//!
//! The panel combines the business-text and card-metric queries for one
//! merchant into a single view: loading, no data, or the populated cards
//! plus the analysis text.

use serde::Serialize;

use super::format::{format_currency, format_number, format_percentage, success_rate_percent};
use super::model::{BusinessInsights, FetchState, MerchantInsights};

/// How a card value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardFormat {
    Number,
    Currency,
    Percentage,
}

/// A card value as received: a number to format, or pre-formatted text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CardValue {
    Number(f64),
    Text(String),
}

/// One metric tile of the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightCard {
    pub title: &'static str,
    pub value: CardValue,
    pub format: CardFormat,
}

impl InsightCard {
    pub fn display_value(&self) -> String {
        match (&self.value, self.format) {
            (CardValue::Number(n), CardFormat::Currency) => format_currency(*n),
            (CardValue::Text(t), CardFormat::Currency) => format!("{}{}", super::CURRENCY_GLYPH, t),
            (CardValue::Number(n), CardFormat::Percentage) => format_percentage(n),
            (CardValue::Text(t), CardFormat::Percentage) => format_percentage(t),
            (CardValue::Number(n), CardFormat::Number) => format_number(*n),
            (CardValue::Text(t), CardFormat::Number) => t.clone(),
        }
    }

    /// The four headline cards, in display order.
    pub fn from_metrics(metrics: &MerchantInsights) -> Vec<InsightCard> {
        vec![
            InsightCard {
                title: "Total Transactions",
                value: CardValue::Number(metrics.total_transactions),
                format: CardFormat::Number,
            },
            InsightCard {
                title: "Total Refund Amount",
                value: CardValue::Number(metrics.total_refund_amount),
                format: CardFormat::Currency,
            },
            InsightCard {
                title: "Average Settlement Amount",
                value: CardValue::Number(metrics.average_settlement_amount),
                format: CardFormat::Currency,
            },
            InsightCard {
                title: "Success Rate",
                value: CardValue::Text(success_rate_percent(metrics.success_rate)),
                format: CardFormat::Percentage,
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelView {
    Loading,
    NoData,
    Ready {
        cards: Option<Vec<InsightCard>>,
        business_text: Option<String>,
    },
}

impl PanelView {
    /// Derives the view from the two underlying queries.
    ///
    /// Either query still pending keeps the whole panel loading. Failed
    /// queries count as "no data" for their half.
    pub fn from_states(
        business: &FetchState<BusinessInsights>,
        cards: &FetchState<MerchantInsights>,
    ) -> Self {
        if business.is_pending() || cards.is_pending() {
            return Self::Loading;
        }

        let business_text = business.data().map(|b| b.insights.clone());
        let cards = cards.data().map(InsightCard::from_metrics);
        if business_text.is_none() && cards.is_none() {
            return Self::NoData;
        }

        Self::Ready {
            cards,
            business_text,
        }
    }
}

/// Panel for one merchant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsPanel {
    pub merchant: String,
    pub view: PanelView,
}

impl InsightsPanel {
    pub fn title(&self) -> String {
        format!("Merchant Insights - {}", self.merchant)
    }

    pub fn subtitle(&self) -> &'static str {
        match self.view {
            PanelView::Loading => "Loading performance data...",
            PanelView::NoData => "Unable to load merchant data",
            PanelView::Ready { .. } => "Performance overview for your Pine Labs account",
        }
    }

    pub fn badge(&self) -> Option<&'static str> {
        match self.view {
            PanelView::Loading => None,
            PanelView::NoData => Some("No Data"),
            PanelView::Ready { .. } => Some("Live Data"),
        }
    }
}
