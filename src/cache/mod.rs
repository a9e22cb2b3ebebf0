//! Кеш вместимости сеансов в Redis.
//!
//! Вместимость здесь только фильтр предусловия (`SeatOutOfRange`), защиту от
//! двойной продажи он не даёт и не должен: её держит уникальный индекс билетов.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::warn;

use crate::models::Showing;
use crate::redis_client::RedisClient;
use crate::store::{Catalog, StoreResult};

fn capacity_key(showing_id: i64) -> String {
    format!("showing:{}:capacity", showing_id)
}

/// Каталог с read-through кешем вместимости. Без Redis просто проксирует
/// запросы во внутренний каталог.
pub struct CachedCatalog<C> {
    inner: C,
    redis: Option<RedisClient>,
    ttl_secs: u64,
}

impl<C: Catalog> CachedCatalog<C> {
    pub fn new(inner: C, redis: Option<RedisClient>, ttl_secs: u64) -> Self {
        Self { inner, redis, ttl_secs }
    }

    pub fn is_enabled(&self) -> bool {
        self.redis.is_some()
    }

    async fn cached_capacity(&self, redis: &RedisClient, showing_id: i64) -> Option<u32> {
        let mut conn = redis.conn.clone();
        let cached: Result<Option<u32>, _> = conn.get(capacity_key(showing_id)).await;
        match cached {
            Ok(value) => value,
            Err(e) => {
                // Redis упал - не страшно, идём в каталог
                warn!("capacity cache read failed for showing {}: {:?}", showing_id, e);
                None
            }
        }
    }

    async fn store_capacity(&self, redis: &RedisClient, showing_id: i64, capacity: u32) {
        let mut conn = redis.conn.clone();
        let result: Result<(), _> = conn
            .set_ex(capacity_key(showing_id), capacity, self.ttl_secs)
            .await;
        if let Err(e) = result {
            warn!("capacity cache write failed for showing {}: {:?}", showing_id, e);
        }
    }
}

#[async_trait]
impl<C: Catalog> Catalog for CachedCatalog<C> {
    async fn get_showing(&self, showing_id: i64) -> StoreResult<Option<Showing>> {
        self.inner.get_showing(showing_id).await
    }

    async fn showing_capacity(&self, showing_id: i64) -> StoreResult<Option<u32>> {
        let Some(redis) = &self.redis else {
            return self.inner.showing_capacity(showing_id).await;
        };

        if let Some(capacity) = self.cached_capacity(redis, showing_id).await {
            return Ok(Some(capacity));
        }

        let capacity = self.inner.showing_capacity(showing_id).await?;
        if let Some(capacity) = capacity {
            self.store_capacity(redis, showing_id, capacity).await;
        }
        Ok(capacity)
    }

    async fn showing_exists(&self, showing_id: i64) -> StoreResult<bool> {
        self.inner.showing_exists(showing_id).await
    }

    async fn customer_exists(&self, customer_id: i64) -> StoreResult<bool> {
        self.inner.customer_exists(customer_id).await
    }
}
