//! Merchant insights domain module.
//!
//! - `model`: server value objects, endpoints and per-query fetch state
//! - `format`: locale-style number, currency and percentage rendering
//! - `panel`: the merchant insights panel derived from two fetch states

pub mod format;
pub mod model;
pub mod panel;

pub use format::{CURRENCY_GLYPH, format_currency, format_number, format_percentage, success_rate_percent};
pub use model::{BusinessInsights, FetchState, InsightsEndpoint, MerchantInsights, WeeklyInsights};
pub use panel::{CardFormat, CardValue, InsightCard, InsightsPanel, PanelView};
