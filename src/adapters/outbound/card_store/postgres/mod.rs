mod queries;

use crate::adapters::outbound::card_store::postgres::queries::{CARDS_BY_IDS, CARDS_BY_NAMES};
use crate::domain::card::CardMetadata;
use crate::domain::game::Game;
use crate::ports::outbound::card_store::{CardStore, CardStoreError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Pool, Row};
use std::collections::HashMap;
use std::env;

pub struct Postgres {
    pool: Pool<sqlx::Postgres>,
}

impl Postgres {
    pub async fn create() -> Self {
        let uri = env::var("PSQL_URI").expect("Postgres uri wasn't in env vars");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&uri)
            .await
            .expect("Failed Postgres connection");

        Self { pool }
    }
}

#[async_trait]
impl CardStore for Postgres {
    async fn lookup_by_identifiers(
        &self,
        game: Game,
        ids: &[String],
    ) -> Result<HashMap<String, CardMetadata>, CardStoreError> {
        match sqlx::query(CARDS_BY_IDS)
            .bind(game.id())
            .bind(ids)
            .fetch_all(&self.pool)
            .await
        {
            Err(why) => {
                log::warn!("Failed cards by id fetch - {why}");
                Err(CardStoreError::new(why.to_string()))
            }
            Ok(rows) => Ok(rows
                .iter()
                .map(|row| (row.get::<String, &str>("id"), CardMetadata::from(row)))
                .collect()),
        }
    }

    async fn lookup_by_names(
        &self,
        game: Game,
        names: &[String],
    ) -> Result<HashMap<String, CardMetadata>, CardStoreError> {
        match sqlx::query(CARDS_BY_NAMES)
            .bind(game.id())
            .bind(names)
            .fetch_all(&self.pool)
            .await
        {
            Err(why) => {
                log::warn!("Failed cards by name fetch - {why}");
                Err(CardStoreError::new(why.to_string()))
            }
            Ok(rows) => Ok(rows
                .iter()
                .map(|row| {
                    (
                        row.get::<String, &str>("normalised_name"),
                        CardMetadata::from(row),
                    )
                })
                .collect()),
        }
    }
}

impl CardMetadata {
    fn from(row: &PgRow) -> Self {
        Self {
            id: row.get::<String, &str>("id"),
            name: row.get::<String, &str>("name"),
            category: row.get::<Option<String>, &str>("category"),
            subtypes: row
                .get::<Option<Vec<String>>, &str>("subtypes")
                .unwrap_or_default(),
            types: row
                .get::<Option<Vec<String>>, &str>("types")
                .unwrap_or_default(),
            stage: row.get::<Option<String>, &str>("stage"),
            legality_marker: row.get::<Option<String>, &str>("regulation_mark"),
            rarity: row.get::<Option<String>, &str>("rarity"),
            small_image: row.get::<Option<String>, &str>("small_image"),
        }
    }
}
