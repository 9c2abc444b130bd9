//! Merchant identity resolution.
//!
//! The merchant in context comes from the `merchant` query parameter of the
//! page that opened the assistant. Every consumer resolves it through
//! [`MerchantContext`] with the one configured default.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PinechatError, Result};

/// Name of the query parameter carrying the merchant.
pub const MERCHANT_QUERY_PARAM: &str = "merchant";

/// Default merchant when the page does not name one.
pub const DEFAULT_MERCHANT_NAME: &str = "IRCTC E-ticketing";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MerchantContext {
    name: String,
}

impl MerchantContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Resolves from a raw query string such as `?merchant=Acme%20Foods&x=1`.
    ///
    /// The first `merchant` parameter wins; a missing or empty value falls
    /// back to `default`.
    pub fn from_query(query: &str, default: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let found = Url::parse("http://localhost/")
            .ok()
            .and_then(|mut url| {
                url.set_query(Some(query));
                Self::find_param(&url)
            });
        Self::new(found.unwrap_or_else(|| default.to_string()))
    }

    /// Resolves from a full page URL.
    pub fn from_page_url(page_url: &str, default: &str) -> Result<Self> {
        let url = Url::parse(page_url)
            .map_err(|e| PinechatError::config(format!("Invalid page URL '{}': {}", page_url, e)))?;
        Ok(Self::new(
            Self::find_param(&url).unwrap_or_else(|| default.to_string()),
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn find_param(url: &Url) -> Option<String> {
        url.query_pairs()
            .find(|(key, _)| key == MERCHANT_QUERY_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }
}

impl fmt::Display for MerchantContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
