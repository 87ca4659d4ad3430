use crate::domain::card::CardMetadata;
use crate::domain::game::Game;
use crate::ports::outbound::cache::Cache;
use crate::ports::outbound::card_store::{CardStore, CardStoreError};
use async_trait::async_trait;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
enum LookupKind {
    Id,
    Name,
}

impl LookupKind {
    fn key(self, game: Game, lookup: &str) -> String {
        let kind = match self {
            LookupKind::Id => "id",
            LookupKind::Name => "name",
        };
        format!("card:{game}:{kind}:{lookup}")
    }
}

/// Serves metadata from the cache where possible and only asks the wrapped
/// store for the misses. Misses found in the store are written back.
pub struct CachedCardStore<CS, C> {
    card_store: CS,
    cache: C,
}

impl<CS, C> CachedCardStore<CS, C>
where
    CS: CardStore + Send + Sync,
    C: Cache + Send + Sync,
{
    pub fn new(card_store: CS, cache: C) -> Self {
        Self { card_store, cache }
    }

    async fn cached(
        &self,
        kind: LookupKind,
        game: Game,
        lookups: &[String],
    ) -> (HashMap<String, CardMetadata>, Vec<String>) {
        let keys = lookups.iter().map(|lookup| kind.key(game, lookup)).collect();
        let values = self.cache.get_many(keys).await;

        let mut hits = HashMap::new();
        let mut misses = Vec::new();
        for (index, lookup) in lookups.iter().enumerate() {
            let Some(value) = values.get(index).and_then(Option::as_deref) else {
                misses.push(lookup.clone());
                continue;
            };
            match ron::from_str::<CardMetadata>(value) {
                Ok(metadata) => {
                    hits.insert(lookup.clone(), metadata);
                }
                Err(why) => {
                    log::warn!("Discarding unreadable cache entry for {lookup} - {why}");
                    if let Err(why) = self.cache.delete(kind.key(game, lookup)).await {
                        log::warn!("Error evicting cache entry for {lookup} - {why}");
                    }
                    misses.push(lookup.clone());
                }
            }
        }

        (hits, misses)
    }

    async fn remember(&self, kind: LookupKind, game: Game, found: &HashMap<String, CardMetadata>) {
        let entries: Vec<(String, String)> = found
            .iter()
            .filter_map(|(lookup, metadata)| match ron::to_string(metadata) {
                Ok(value) => Some((kind.key(game, lookup), value)),
                Err(why) => {
                    log::warn!("Failed to serialise card metadata for {lookup} - {why}");
                    None
                }
            })
            .collect();

        if entries.is_empty() {
            return;
        }
        if let Err(why) = self.cache.set_many(entries).await {
            log::warn!("Error caching card metadata - {why}");
        }
    }

    async fn lookup(
        &self,
        kind: LookupKind,
        game: Game,
        lookups: &[String],
    ) -> Result<HashMap<String, CardMetadata>, CardStoreError> {
        let (mut found, misses) = self.cached(kind, game, lookups).await;
        if misses.is_empty() {
            return Ok(found);
        }

        let fetched = match kind {
            LookupKind::Id => self.card_store.lookup_by_identifiers(game, &misses).await?,
            LookupKind::Name => self.card_store.lookup_by_names(game, &misses).await?,
        };
        log::debug!(
            "Card cache served {} of {} {kind:?} lookups",
            found.len(),
            lookups.len()
        );

        self.remember(kind, game, &fetched).await;
        found.extend(fetched);
        Ok(found)
    }
}

#[async_trait]
impl<CS, C> CardStore for CachedCardStore<CS, C>
where
    CS: CardStore + Send + Sync,
    C: Cache + Send + Sync,
{
    async fn lookup_by_identifiers(
        &self,
        game: Game,
        ids: &[String],
    ) -> Result<HashMap<String, CardMetadata>, CardStoreError> {
        self.lookup(LookupKind::Id, game, ids).await
    }

    async fn lookup_by_names(
        &self,
        game: Game,
        names: &[String],
    ) -> Result<HashMap<String, CardMetadata>, CardStoreError> {
        self.lookup(LookupKind::Name, game, names).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::fixtures;
    use crate::ports::outbound::cache::{CacheError, MockCache};
    use crate::ports::outbound::card_store::MockCardStore;

    fn iono() -> CardMetadata {
        fixtures::metadata("sv2-185", "Iono", "Trainer")
    }

    #[tokio::test]
    async fn test_all_hits_skip_the_store() {
        let mut cache = MockCache::new();
        cache
            .expect_get_many()
            .times(1)
            .withf(|keys| keys == &vec![String::from("card:pokemon:id:sv2-185")])
            .returning(|_| vec![ron::to_string(&iono()).ok()]);
        cache.expect_set_many().times(0);

        let mut card_store = MockCardStore::new();
        card_store.expect_lookup_by_identifiers().times(0);

        let store = CachedCardStore::new(card_store, cache);
        let found = store
            .lookup_by_identifiers(Game::Pokemon, &[String::from("sv2-185")])
            .await
            .unwrap();

        assert_eq!(found.get("sv2-185"), Some(&iono()));
    }

    #[tokio::test]
    async fn test_misses_go_to_the_store_and_are_cached() {
        let mut cache = MockCache::new();
        cache
            .expect_get_many()
            .times(1)
            .returning(|keys| keys.iter().map(|_| None).collect());
        cache
            .expect_set_many()
            .times(1)
            .withf(|entries| entries.len() == 1 && entries[0].0 == "card:pokemon:name:iono")
            .returning(|_| Ok(()));

        let mut card_store = MockCardStore::new();
        card_store
            .expect_lookup_by_names()
            .times(1)
            .withf(|_, names| names == [String::from("iono"), String::from("nothing")])
            .returning(|_, _| Ok(HashMap::from([(String::from("iono"), iono())])));

        let store = CachedCardStore::new(card_store, cache);
        let found = store
            .lookup_by_names(
                Game::Pokemon,
                &[String::from("iono"), String::from("nothing")],
            )
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert!(found.contains_key("iono"));
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_a_miss() {
        let mut cache = MockCache::new();
        cache
            .expect_get_many()
            .returning(|_| vec![Some(String::from("not ron at all ("))]);
        cache
            .expect_delete()
            .times(1)
            .withf(|key| key == "card:pokemon:id:sv2-185")
            .returning(|_| Ok(()));
        cache
            .expect_set_many()
            .returning(|_| Err(CacheError::new(String::from("read only"))));

        let mut card_store = MockCardStore::new();
        card_store
            .expect_lookup_by_identifiers()
            .times(1)
            .returning(|_, _| Ok(HashMap::from([(String::from("sv2-185"), iono())])));

        let store = CachedCardStore::new(card_store, cache);
        let found = store
            .lookup_by_identifiers(Game::Pokemon, &[String::from("sv2-185")])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let mut cache = MockCache::new();
        cache.expect_get_many().returning(|_| vec![None]);
        cache.expect_set_many().times(0);

        let mut card_store = MockCardStore::new();
        card_store
            .expect_lookup_by_identifiers()
            .returning(|_, _| Err(CardStoreError::new(String::from("down"))));

        let store = CachedCardStore::new(card_store, cache);
        let result = store
            .lookup_by_identifiers(Game::Pokemon, &[String::from("sv2-185")])
            .await;

        assert!(result.is_err());
    }
}
