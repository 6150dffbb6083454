//! Process-wide, per-provider cache of model descriptors (§4.1).
//!
//! Each provider owns an `ArcSwap<CacheSlot>`; refreshes are single-flighted
//! per provider via a `try_lock` guard, and the cache slot is replaced with a
//! fresh `Arc` rather than mutated in place, so readers never block on
//! network IO and never observe a half-written slot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub mod static_source;

pub const DEFAULT_TTL_FRESH: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_TTL_STALE: Duration = Duration::from_secs(60 * 60);

/// Filter accepted by [`Catalog::list_models`], mirroring the `/v1/models`
/// query parameters in spec.md §6 (`provider`, `is_private`, `min_context`,
/// `max_price`).
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub is_private: Option<bool>,
    pub min_context: Option<u64>,
    /// Micro-dollars per token; keeps models whose prompt *and* completion
    /// price are both at or under this ceiling.
    pub max_price: Option<i64>,
}

impl CatalogFilter {
    fn matches(&self, m: &ModelDescriptor) -> bool {
        if let Some(is_private) = self.is_private
            && m.is_private != is_private
        {
            return false;
        }
        if let Some(min_context) = self.min_context
            && m.context_length < min_context
        {
            return false;
        }
        if let Some(max_price) = self.max_price
            && (m.prompt_price_micros > max_price || m.completion_price_micros > max_price)
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub id: String,
    pub provider: String,
    pub display_name: Option<String>,
    pub context_length: u64,
    /// Micro-dollars (1e-6 USD) per prompt token.
    pub prompt_price_micros: i64,
    /// Micro-dollars (1e-6 USD) per completion token.
    pub completion_price_micros: i64,
    pub modality: Vec<String>,
    pub is_private: bool,
}

/// Supplies the raw descriptor list for one provider. A live upstream
/// model-list call is a drop-in future implementation of this seam; today
/// providers are backed by [`static_source::ConfigCatalogSource`].
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_models(&self, provider: &str) -> anyhow::Result<Vec<ModelDescriptor>>;
}

#[derive(Debug, Clone, Default)]
struct CacheSlot {
    descriptors: Vec<ModelDescriptor>,
    last_success: Option<Instant>,
    last_attempt: Option<Instant>,
}

struct ProviderCache {
    name: String,
    slot: arc_swap::ArcSwap<CacheSlot>,
    fallback: Vec<ModelDescriptor>,
    refreshing: Mutex<()>,
}

pub struct Catalog {
    source: Arc<dyn CatalogSource>,
    providers: arc_swap::ArcSwap<HashMap<String, Arc<ProviderCache>>>,
    ttl_fresh: Duration,
    ttl_stale: Duration,
    /// Deterministic tie-break order for `resolve_provider`/`get_model` when a
    /// bare model id is carried by more than one provider.
    tie_break_order: Vec<String>,
}

impl Catalog {
    pub fn new(source: Arc<dyn CatalogSource>, tie_break_order: Vec<String>) -> Self {
        Self {
            source,
            providers: arc_swap::ArcSwap::from_pointee(HashMap::new()),
            ttl_fresh: DEFAULT_TTL_FRESH,
            ttl_stale: DEFAULT_TTL_STALE,
            tie_break_order,
        }
    }

    pub fn with_ttls(mut self, ttl_fresh: Duration, ttl_stale: Duration) -> Self {
        self.ttl_fresh = ttl_fresh;
        self.ttl_stale = ttl_stale;
        self
    }

    /// Registers a provider with its fallback descriptor list. Re-registering
    /// an existing provider replaces only the fallback; live cache data (if
    /// any) is kept.
    pub fn register_provider(&self, provider: &str, fallback: Vec<ModelDescriptor>) {
        let mut map = self.providers.load().as_ref().clone();
        let slot = match map.get(provider) {
            Some(existing) => existing.slot.load_full(),
            None => Arc::new(CacheSlot::default()),
        };
        map.insert(
            provider.to_string(),
            Arc::new(ProviderCache {
                name: provider.to_string(),
                slot: arc_swap::ArcSwap::from(slot),
                fallback,
                refreshing: Mutex::new(()),
            }),
        );
        self.providers.store(Arc::new(map));
    }

    /// Best-effort warm-up at startup; failures are logged, never fatal.
    pub async fn warm_all(&self) {
        let names: Vec<String> = self.providers.load().keys().cloned().collect();
        for name in names {
            if let Err(err) = self.refresh_now(&name).await {
                tracing::warn!(provider = %name, error = %err, "catalog warm-up fetch failed");
            }
        }
    }

    /// Lists descriptors for one provider (or all, if `provider` is `None`),
    /// keeping only those matching `filter`.
    pub fn list_models(&self, provider: Option<&str>, filter: &CatalogFilter) -> Vec<ModelDescriptor> {
        let map = self.providers.load();
        let raw = match provider {
            Some(p) => map
                .get(p)
                .map(|cache| self.serve(cache))
                .unwrap_or_default(),
            None => map.values().flat_map(|cache| self.serve(cache)).collect(),
        };
        raw.into_iter().filter(|m| filter.matches(m)).collect()
    }

    pub fn get_model(&self, model_id: &str, provider: Option<&str>) -> Option<ModelDescriptor> {
        let filter = CatalogFilter::default();
        match provider {
            Some(p) => self
                .list_models(Some(p), &filter)
                .into_iter()
                .find(|m| m.id == model_id),
            None => {
                for name in self.provider_scan_order() {
                    if let Some(m) = self
                        .list_models(Some(&name), &filter)
                        .into_iter()
                        .find(|m| m.id == model_id)
                    {
                        return Some(m);
                    }
                }
                None
            }
        }
    }

    pub fn resolve_provider(&self, model_id: &str) -> Option<String> {
        if let Some((prefix, _rest)) = model_id.split_once('/') {
            let map = self.providers.load();
            if map.contains_key(prefix) {
                return Some(prefix.to_string());
            }
        }

        let filter = CatalogFilter::default();
        self.provider_scan_order().into_iter().find(|name| {
            self.list_models(Some(name), &filter)
                .iter()
                .any(|m| m.id == model_id)
        })
    }

    /// Returns `(prompt_price, completion_price)` in micro-dollars per token;
    /// `(0, 0)` if the model is unpriced or unknown. Never fails.
    pub fn price(&self, model_id: &str, provider: &str) -> (i64, i64) {
        match self.get_model(model_id, Some(provider)) {
            Some(m) => (m.prompt_price_micros, m.completion_price_micros),
            None => (0, 0),
        }
    }

    /// Serves from cache, enqueuing a background refresh when stale.
    /// Readers never block on network IO; beyond `ttl_stale` with no prior
    /// success the fallback list is served immediately.
    fn serve(&self, cache: &Arc<ProviderCache>) -> Vec<ModelDescriptor> {
        let slot = cache.slot.load();
        let age = slot.last_success.map(|t| t.elapsed());

        let needs_refresh = match age {
            Some(age) => age >= self.ttl_fresh,
            None => true,
        };
        if needs_refresh {
            let cache = cache.clone();
            let source = self.source.clone();
            tokio::spawn(async move {
                Self::refresh_slot(&cache, source.as_ref()).await;
            });
        }

        match age {
            Some(age) if age < self.ttl_stale && !slot.descriptors.is_empty() => {
                slot.descriptors.clone()
            }
            _ if !slot.descriptors.is_empty() => slot.descriptors.clone(),
            _ => cache.fallback.clone(),
        }
    }

    /// Forces a refresh attempt for one provider and waits for it to finish
    /// (used at startup and by the admin catalog-refresh endpoint).
    pub async fn refresh_now(&self, provider: &str) -> anyhow::Result<()> {
        let map = self.providers.load();
        let Some(cache) = map.get(provider).cloned() else {
            return Ok(());
        };
        Self::refresh_slot(&cache, self.source.as_ref()).await;
        Ok(())
    }

    /// Fetches and swaps in a new slot. Single-flighted per provider: if a
    /// refresh is already running, this call is a no-op rather than queuing
    /// a second one.
    async fn refresh_slot(cache: &Arc<ProviderCache>, source: &dyn CatalogSource) {
        let Ok(_permit) = cache.refreshing.try_lock() else {
            return;
        };

        let now = Instant::now();
        match source.fetch_models(&cache.name).await {
            Ok(descriptors) => {
                cache.slot.store(Arc::new(CacheSlot {
                    descriptors,
                    last_success: Some(now),
                    last_attempt: Some(now),
                }));
            }
            Err(err) => {
                tracing::warn!(provider = %cache.name, error = %err, "catalog refresh failed");
                let previous = cache.slot.load();
                cache.slot.store(Arc::new(CacheSlot {
                    descriptors: previous.descriptors.clone(),
                    last_success: previous.last_success,
                    last_attempt: Some(now),
                }));
            }
        }
    }

    fn provider_scan_order(&self) -> Vec<String> {
        let map = self.providers.load();
        let mut names: Vec<String> = self
            .tie_break_order
            .iter()
            .filter(|n| map.contains_key(n.as_str()))
            .cloned()
            .collect();
        for name in map.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}
