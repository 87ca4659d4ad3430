pub mod cached;
pub mod postgres;

use crate::adapters::outbound::cache::init_cache;
use crate::adapters::outbound::card_store::cached::CachedCardStore;
use crate::adapters::outbound::card_store::postgres::Postgres;
use crate::ports::outbound::card_store::CardStore;

pub async fn init_card_store() -> impl CardStore {
    Postgres::create().await
}

/// Postgres behind the Redis cache.
pub async fn init_cached_card_store() -> impl CardStore {
    CachedCardStore::new(Postgres::create().await, init_cache())
}
