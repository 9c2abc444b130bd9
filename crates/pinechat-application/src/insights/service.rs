use pinechat_core::Result;
use pinechat_core::backend::InsightsBackend;
use pinechat_core::insights::{
    BusinessInsights, FetchState, InsightsEndpoint, InsightsPanel, MerchantInsights, PanelView,
    WeeklyInsights,
};
use pinechat_core::merchant::MerchantContext;
use std::future::Future;
use std::sync::Arc;

use super::cache::{InsightsData, QueryCache, QueryKey};

/// Cached reads of the insights endpoints.
///
/// A successful query is served from cache until it is invalidated; a
/// different merchant is a different query. Failed queries are kept as
/// `Error` and retried on the next explicit fetch.
pub struct InsightsService {
    backend: Arc<dyn InsightsBackend>,
    cache: QueryCache,
}

impl InsightsService {
    pub fn new(backend: Arc<dyn InsightsBackend>) -> Self {
        Self {
            backend,
            cache: QueryCache::new(),
        }
    }

    pub async fn business_insights(
        &self,
        merchant: &MerchantContext,
    ) -> FetchState<BusinessInsights> {
        let key = QueryKey::merchant(InsightsEndpoint::BusinessInsights, merchant.name());
        self.fetch(
            key,
            self.backend.business_insights(merchant.name()),
            InsightsData::Business,
            as_business,
        )
        .await
    }

    pub async fn card_insights(&self, merchant: &MerchantContext) -> FetchState<MerchantInsights> {
        let key = QueryKey::merchant(InsightsEndpoint::CardInsights, merchant.name());
        self.fetch(
            key,
            self.backend.card_insights(merchant.name()),
            InsightsData::Cards,
            as_cards,
        )
        .await
    }

    pub async fn weekly_insights(&self) -> FetchState<WeeklyInsights> {
        let key = QueryKey::global(InsightsEndpoint::WeeklyInsights);
        self.fetch(
            key,
            self.backend.weekly_insights(),
            InsightsData::Weekly,
            as_weekly,
        )
        .await
    }

    pub async fn business_insights_feed(&self) -> FetchState<BusinessInsights> {
        let key = QueryKey::global(InsightsEndpoint::BusinessInsightsFeed);
        self.fetch(
            key,
            self.backend.business_insights_feed(),
            InsightsData::Business,
            as_business,
        )
        .await
    }

    /// Loads business text and card metrics together and builds the panel.
    pub async fn load_panel(&self, merchant: &MerchantContext) -> InsightsPanel {
        let (business, cards) =
            tokio::join!(self.business_insights(merchant), self.card_insights(merchant));
        InsightsPanel {
            merchant: merchant.name().to_string(),
            view: PanelView::from_states(&business, &cards),
        }
    }

    /// Builds the panel from whatever is cached, without fetching.
    pub async fn cached_panel(&self, merchant: &MerchantContext) -> InsightsPanel {
        let business = self
            .state(InsightsEndpoint::BusinessInsights, Some(merchant))
            .await
            .map(|data| as_business(&data));
        let cards = self
            .state(InsightsEndpoint::CardInsights, Some(merchant))
            .await
            .map(|data| as_cards(&data));

        InsightsPanel {
            merchant: merchant.name().to_string(),
            view: PanelView::from_states(&flatten(business), &flatten(cards)),
        }
    }

    /// Current state of one query.
    pub async fn state(
        &self,
        endpoint: InsightsEndpoint,
        merchant: Option<&MerchantContext>,
    ) -> FetchState<InsightsData> {
        self.cache.get(&key_for(endpoint, merchant)).await
    }

    /// Drops one query so the next fetch reloads it.
    pub async fn invalidate(&self, endpoint: InsightsEndpoint, merchant: Option<&MerchantContext>) {
        self.cache.remove(&key_for(endpoint, merchant)).await;
    }

    /// Drops every query scoped to `merchant`.
    pub async fn invalidate_merchant(&self, merchant: &MerchantContext) {
        self.cache.remove_merchant(merchant.name()).await;
    }

    pub async fn invalidate_all(&self) {
        self.cache.clear().await;
    }

    async fn fetch<T, F>(
        &self,
        key: QueryKey,
        load: F,
        wrap: fn(T) -> InsightsData,
        unwrap: fn(&InsightsData) -> Option<T>,
    ) -> FetchState<T>
    where
        T: Clone,
        F: Future<Output = Result<T>>,
    {
        if let FetchState::Success(data) = self.cache.get(&key).await
            && let Some(cached) = unwrap(&data)
        {
            tracing::debug!(endpoint = %key.endpoint, merchant = ?key.merchant, "Insights cache hit");
            return FetchState::Success(cached);
        }

        let loading = self.cache.begin_loading(key.clone()).await;
        tracing::debug!(endpoint = %key.endpoint, merchant = ?key.merchant, "Loading insights");

        match load.await {
            Ok(data) => {
                loading
                    .complete(FetchState::Success(wrap(data.clone())))
                    .await;
                FetchState::Success(data)
            }
            Err(e) => {
                tracing::warn!(endpoint = %key.endpoint, merchant = ?key.merchant, error = %e, "Failed to load insights");
                let message = format!("Failed to fetch {}: {}", describe(key.endpoint), e);
                loading.complete(FetchState::Error(message.clone())).await;
                FetchState::Error(message)
            }
        }
    }
}

fn key_for(endpoint: InsightsEndpoint, merchant: Option<&MerchantContext>) -> QueryKey {
    match merchant {
        Some(merchant) if endpoint.is_merchant_scoped() => QueryKey::merchant(endpoint, merchant.name()),
        _ => QueryKey::global(endpoint),
    }
}

fn describe(endpoint: InsightsEndpoint) -> &'static str {
    match endpoint {
        InsightsEndpoint::BusinessInsights | InsightsEndpoint::BusinessInsightsFeed => {
            "business insights"
        }
        InsightsEndpoint::CardInsights => "card insights",
        InsightsEndpoint::WeeklyInsights => "weekly insights",
    }
}

fn as_business(data: &InsightsData) -> Option<BusinessInsights> {
    match data {
        InsightsData::Business(b) => Some(b.clone()),
        _ => None,
    }
}

fn as_cards(data: &InsightsData) -> Option<MerchantInsights> {
    match data {
        InsightsData::Cards(c) => Some(c.clone()),
        _ => None,
    }
}

fn as_weekly(data: &InsightsData) -> Option<WeeklyInsights> {
    match data {
        InsightsData::Weekly(w) => Some(w.clone()),
        _ => None,
    }
}

fn flatten<T>(state: FetchState<Option<T>>) -> FetchState<T> {
    match state {
        FetchState::Idle => FetchState::Idle,
        FetchState::Loading => FetchState::Loading,
        FetchState::Success(Some(data)) => FetchState::Success(data),
        FetchState::Success(None) => FetchState::Idle,
        FetchState::Error(message) => FetchState::Error(message),
    }
}
