use crate::ports::outbound::cache::{Cache, CacheError};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisResult};
use std::env;

const EXPIRY_SECONDS: u64 = 86400;

pub struct Redis {
    client: Client,
}

impl Redis {
    pub fn create() -> Self {
        let url = env::var("REDIS_URL").expect("REDIS_URL must be set");
        let client = Client::open(url).expect("failed to open redis client");
        Self { client }
    }

    async fn new_connection(&self) -> Result<MultiplexedConnection, CacheError> {
        match self.client.get_multiplexed_async_connection().await {
            Ok(connection) => Ok(connection),
            Err(why) => {
                log::warn!("Error making connection {why:?}");
                Err(CacheError::new(String::from("Unable to get connection")))
            }
        }
    }
}

#[async_trait]
impl Cache for Redis {
    async fn get_many(&self, keys: Vec<String>) -> Vec<Option<String>> {
        let misses = vec![None; keys.len()];
        if keys.is_empty() {
            return misses;
        }
        let Ok(mut connection) = self.new_connection().await else {
            return misses;
        };

        match connection.mget::<Vec<String>, Vec<Option<String>>>(keys).await {
            Ok(values) if values.len() == misses.len() => values,
            Ok(values) => {
                log::warn!(
                    "Cache returned {} values for {} keys",
                    values.len(),
                    misses.len()
                );
                misses
            }
            Err(why) => {
                log::warn!("Error getting values in cache {why:?}");
                misses
            }
        }
    }

    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), CacheError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut connection = self.new_connection().await?;

        let mut pipe = redis::pipe();
        for (key, value) in entries {
            pipe.set_ex(key, value, EXPIRY_SECONDS).ignore();
        }
        let result: RedisResult<()> = pipe.query_async(&mut connection).await;

        if let Err(why) = result {
            log::warn!("Error setting values in cache {why:?}");
            Err(CacheError::new(String::from("Unable to set values")))
        } else {
            Ok(())
        }
    }

    async fn delete(&self, key: String) -> Result<(), CacheError> {
        if let Err(why) = self.new_connection().await?.del::<String, ()>(key).await {
            log::warn!("Error deleting value in cache {why:?}");
            Err(CacheError::new(String::from("Unable to delete cache")))
        } else {
            Ok(())
        }
    }
}
