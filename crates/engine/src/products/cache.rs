use std::collections::HashMap;

use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use super::Product;

const EVENT_CAPACITY: usize = 64;

/// Published whenever cached products stop being valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheEvent {
    Invalidated(Uuid),
    Cleared,
}

/// Snapshot of the cache's write counter, taken before a store lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Generation(u64);

#[derive(Debug, Default)]
struct Entries {
    products: HashMap<Uuid, Product>,
    generation: u64,
}

/// In-process cache of normalized products, keyed by id.
///
/// Every product write invalidates its entry and announces it on the event
/// channel. Sending with no subscribers is not an error.
///
/// Readers take a [`Generation`] before looking a product up in the stores
/// and hand it back to [`ProductCache::put`]. Any invalidation in between
/// bumps the counter and the put is dropped, so a lookup that raced with a
/// write never caches the old row.
#[derive(Debug)]
pub struct ProductCache {
    entries: RwLock<Entries>,
    events: broadcast::Sender<CacheEvent>,
}

impl Default for ProductCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: RwLock::new(Entries::default()),
            events,
        }
    }

    pub async fn get(&self, id: &Uuid) -> Option<Product> {
        self.entries.read().await.products.get(id).cloned()
    }

    pub async fn generation(&self) -> Generation {
        Generation(self.entries.read().await.generation)
    }

    /// Caches `product` unless the cache was invalidated after `seen` was
    /// taken. Returns whether the product was stored.
    pub async fn put(&self, product: Product, seen: Generation) -> bool {
        let mut entries = self.entries.write().await;
        if entries.generation != seen.0 {
            tracing::debug!(id = %product.id, "stale product not cached");
            return false;
        }
        entries.products.insert(product.id, product);
        true
    }

    pub async fn invalidate(&self, id: Uuid) {
        {
            let mut entries = self.entries.write().await;
            entries.products.remove(&id);
            entries.generation = entries.generation.wrapping_add(1);
        }
        let _ = self.events.send(CacheEvent::Invalidated(id));
    }

    pub async fn clear(&self) {
        {
            let mut entries = self.entries.write().await;
            entries.products.clear();
            entries.generation = entries.generation.wrapping_add(1);
        }
        let _ = self.events.send(CacheEvent::Cleared);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.products.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.products.is_empty()
    }
}
