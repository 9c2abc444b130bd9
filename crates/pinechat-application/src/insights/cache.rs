use pinechat_core::insights::{
    BusinessInsights, FetchState, InsightsEndpoint, MerchantInsights, WeeklyInsights,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Identifies one cached query: an endpoint plus, for merchant-scoped
/// endpoints, the merchant name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub endpoint: InsightsEndpoint,
    pub merchant: Option<String>,
}

impl QueryKey {
    pub fn merchant(endpoint: InsightsEndpoint, merchant: impl Into<String>) -> Self {
        Self {
            endpoint,
            merchant: Some(merchant.into()),
        }
    }

    pub fn global(endpoint: InsightsEndpoint) -> Self {
        Self {
            endpoint,
            merchant: None,
        }
    }
}

/// Any payload the insights endpoints return.
#[derive(Debug, Clone, PartialEq)]
pub enum InsightsData {
    Business(BusinessInsights),
    Cards(MerchantInsights),
    Weekly(WeeklyInsights),
}

/// In-memory cache of query states.
///
/// Entries move `Loading -> Success | Error` as fetches complete; removing an
/// entry puts the query back to `Idle`.
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<QueryKey, FetchState<InsightsData>>>>,
}

impl QueryCache {
    /// Creates a new empty QueryCache.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Gets the state of a query, `Idle` when nothing is cached.
    pub async fn get(&self, key: &QueryKey) -> FetchState<InsightsData> {
        let entries = self.entries.read().await;
        entries.get(key).cloned().unwrap_or_default()
    }

    /// Records the state of a query.
    pub async fn insert(&self, key: QueryKey, state: FetchState<InsightsData>) {
        let mut entries = self.entries.write().await;
        entries.insert(key, state);
    }

    /// Removes one query.
    pub async fn remove(&self, key: &QueryKey) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }

    /// Removes every query scoped to `merchant`.
    pub async fn remove_merchant(&self, merchant: &str) {
        let mut entries = self.entries.write().await;
        entries.retain(|key, _| key.merchant.as_deref() != Some(merchant));
    }

    /// Clears all cached queries.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Marks `key` as `Loading` and returns a guard that puts it back to
    /// `Idle` if dropped before [`LoadingGuard::complete`] is called.
    pub async fn begin_loading(&self, key: QueryKey) -> LoadingGuard {
        self.insert(key.clone(), FetchState::Loading).await;
        LoadingGuard {
            entries: Arc::clone(&self.entries),
            key: Some(key),
        }
    }
}

/// An in-progress fetch of one query.
pub struct LoadingGuard {
    entries: Arc<RwLock<HashMap<QueryKey, FetchState<InsightsData>>>>,
    key: Option<QueryKey>,
}

impl LoadingGuard {
    /// Records the outcome of the fetch.
    pub async fn complete(mut self, state: FetchState<InsightsData>) {
        if let Some(key) = self.key.take() {
            self.entries.write().await.insert(key, state);
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let Some(key) = self.key.take() else {
            return;
        };

        fn reset(entries: &mut HashMap<QueryKey, FetchState<InsightsData>>, key: &QueryKey) {
            if matches!(entries.get(key), Some(FetchState::Loading)) {
                entries.remove(key);
            }
        }

        if let Ok(mut entries) = self.entries.try_write() {
            reset(&mut entries, &key);
        } else if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let entries = Arc::clone(&self.entries);
            handle.spawn(async move {
                reset(&mut *entries.write().await, &key);
            });
        } else {
            tracing::warn!(endpoint = %key.endpoint, "Abandoned insights fetch left in Loading");
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn business(text: &str) -> FetchState<InsightsData> {
        FetchState::Success(InsightsData::Business(BusinessInsights {
            insights: text.to_string(),
        }))
    }

    #[tokio::test]
    async fn test_missing_entry_is_idle() {
        let cache = QueryCache::new();
        let key = QueryKey::merchant(InsightsEndpoint::BusinessInsights, "Acme");
        assert_eq!(cache.get(&key).await, FetchState::Idle);
    }

    #[tokio::test]
    async fn test_keys_separate_merchants() {
        let cache = QueryCache::new();
        let acme = QueryKey::merchant(InsightsEndpoint::BusinessInsights, "Acme");
        let bistro = QueryKey::merchant(InsightsEndpoint::BusinessInsights, "Bistro");

        cache.insert(acme.clone(), business("acme")).await;
        assert_eq!(cache.get(&acme).await, business("acme"));
        assert_eq!(cache.get(&bistro).await, FetchState::Idle);
    }

    #[tokio::test]
    async fn test_remove_merchant_keeps_others() {
        let cache = QueryCache::new();
        cache
            .insert(QueryKey::merchant(InsightsEndpoint::BusinessInsights, "Acme"), business("a"))
            .await;
        cache
            .insert(QueryKey::merchant(InsightsEndpoint::CardInsights, "Acme"), FetchState::Loading)
            .await;
        cache
            .insert(QueryKey::merchant(InsightsEndpoint::BusinessInsights, "Bistro"), business("b"))
            .await;
        cache
            .insert(QueryKey::global(InsightsEndpoint::WeeklyInsights), FetchState::Loading)
            .await;

        cache.remove_merchant("Acme").await;
        assert_eq!(cache.len().await, 2);

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_dropped_loading_guard_resets_to_idle() {
        let cache = QueryCache::new();
        let key = QueryKey::merchant(InsightsEndpoint::CardInsights, "Acme");

        let guard = cache.begin_loading(key.clone()).await;
        assert_eq!(cache.get(&key).await, FetchState::Loading);
        drop(guard);
        assert_eq!(cache.get(&key).await, FetchState::Idle);

        let guard = cache.begin_loading(key.clone()).await;
        guard.complete(business("done")).await;
        assert_eq!(cache.get(&key).await, business("done"));
    }
}
