//! Insights application services.
//!
//! Cached, per-merchant reads of the insights endpoints and the insights
//! panel built on top of them.

mod cache;
mod service;

pub use cache::{InsightsData, LoadingGuard, QueryCache, QueryKey};
pub use service::InsightsService;
