pub mod api;
pub mod cache;
pub mod items;
pub mod model;
pub mod store;

use std::sync::Arc;

use axum::Router;
use horde_core::{CacheConfig, Module};
use horde_kv::KVStore;

use cache::ResponseCache;
use store::ZombieStore;

/// The zombie module: a catalogue of zombies and the items they carry,
/// served over HTTP under `/zombies`.
pub struct ZombieModule {
    store: Arc<ZombieStore>,
    cache: Option<ResponseCache>,
}

impl ZombieModule {
    pub fn new(kv: Arc<dyn KVStore>, cache: &CacheConfig) -> Self {
        Self {
            store: Arc::new(ZombieStore::new(kv)),
            cache: ResponseCache::from_config(cache),
        }
    }
}

impl Module for ZombieModule {
    fn name(&self) -> &str {
        "zombies"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.store), self.cache.clone())
    }
}
