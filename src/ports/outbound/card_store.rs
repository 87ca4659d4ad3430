use crate::domain::card::CardMetadata;
use crate::domain::game::Game;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, derive(Clone))]
#[derive(Debug, Error)]
#[error("Error looking up card metadata: {0}")]
pub struct CardStoreError(String);

impl CardStoreError {
    #[must_use]
    pub fn new(msg: String) -> Self {
        Self(msg)
    }
}

/// Read-only source of authoritative card metadata.
///
/// Both lookups are batched: callers pass every key they need at once. A key
/// missing from the returned map means the card is unknown, not an error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CardStore {
    /// Keyed by canonical identifier, e.g. `sv2-185`.
    async fn lookup_by_identifiers(
        &self,
        game: Game,
        ids: &[String],
    ) -> Result<HashMap<String, CardMetadata>, CardStoreError>;

    /// Keyed by the lookup-normalised card name (see `utils::normalise`).
    async fn lookup_by_names(
        &self,
        game: Game,
        names: &[String],
    ) -> Result<HashMap<String, CardMetadata>, CardStoreError>;
}
