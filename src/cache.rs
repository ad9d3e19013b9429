//! Load Cache - memoized source loads
//!
//! Each remote CSV is fetched at most once per (source, URL). The cache is a
//! read-through Moka cache: successful loads are stored, failed loads are not
//! (so the next interaction retries them). Changing a URL changes the key,
//! which is the only implicit invalidation; `invalidate` and
//! `invalidate_all` are the explicit ones.

use moka::sync::Cache;
use std::sync::Arc;

use crate::data::Loaded;
use crate::records::{CensusRecord, HazardTable, HealthRecord};
use crate::schema::SourceKind;

/// Cache key: which source, fetched from where
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub kind: SourceKind,
    pub url: Option<String>,
}

/// A table type with its own store inside [`LoadCache`]
pub trait Cacheable: Send + Sync + 'static {
    fn store(cache: &LoadCache) -> &Cache<LoadKey, Arc<Self>>;
}

impl Cacheable for HazardTable {
    fn store(cache: &LoadCache) -> &Cache<LoadKey, Arc<Self>> {
        &cache.hazards
    }
}

impl Cacheable for Vec<CensusRecord> {
    fn store(cache: &LoadCache) -> &Cache<LoadKey, Arc<Self>> {
        &cache.census
    }
}

impl Cacheable for Vec<HealthRecord> {
    fn store(cache: &LoadCache) -> &Cache<LoadKey, Arc<Self>> {
        &cache.health
    }
}

/// One Moka store per table type, each bounded by `max_capacity`
#[derive(Clone)]
pub struct LoadCache {
    hazards: Cache<LoadKey, Arc<HazardTable>>,
    census: Cache<LoadKey, Arc<Vec<CensusRecord>>>,
    health: Cache<LoadKey, Arc<Vec<HealthRecord>>>,
}

impl LoadCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            hazards: Cache::builder().max_capacity(max_capacity).build(),
            census: Cache::builder().max_capacity(max_capacity).build(),
            health: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    /// Return the cached table for `(kind, url)` or run `load`
    ///
    /// The loaded table is only cached when it carries no warning.
    pub fn get_or_load<T, L>(&self, kind: SourceKind, url: Option<&str>, load: L) -> Loaded<T>
    where
        T: Cacheable,
        L: FnOnce() -> Loaded<T>,
    {
        let store = T::store(self);
        let key = LoadKey { kind, url: url.map(str::to_string) };

        if let Some(table) = store.get(&key) {
            tracing::debug!("Cache hit for {} source", kind);
            return Loaded { table, warning: None };
        }

        tracing::debug!("Cache miss for {} source", kind);
        let loaded = load();
        if loaded.warning.is_none() {
            store.insert(key, Arc::clone(&loaded.table));
        }
        loaded
    }

    /// Drop every cached entry for a source kind, whatever its URL
    pub fn invalidate(&self, kind: SourceKind) {
        match kind {
            SourceKind::Hazard(_) => invalidate_kind(&self.hazards, kind),
            SourceKind::Census => invalidate_kind(&self.census, kind),
            SourceKind::Health => invalidate_kind(&self.health, kind),
        }
    }

    pub fn invalidate_all(&self) {
        self.hazards.invalidate_all();
        self.census.invalidate_all();
        self.health.invalidate_all();
    }

    pub fn contains(&self, kind: SourceKind, url: Option<&str>) -> bool {
        let key = LoadKey { kind, url: url.map(str::to_string) };
        match kind {
            SourceKind::Hazard(_) => self.hazards.get(&key).is_some(),
            SourceKind::Census => self.census.get(&key).is_some(),
            SourceKind::Health => self.health.get(&key).is_some(),
        }
    }
}

fn invalidate_kind<V>(store: &Cache<LoadKey, V>, kind: SourceKind)
where
    V: Clone + Send + Sync + 'static,
{
    let stale: Vec<Arc<LoadKey>> = store
        .iter()
        .filter(|(key, _)| key.kind == kind)
        .map(|(key, _)| key)
        .collect();
    for key in stale {
        store.invalidate(key.as_ref());
    }
}
