use redis::{aio::ConnectionManager, Client};
use std::time::Duration;

// ConnectionManager сам переподключается, кеш вместимости живёт весь аптайм сервиса
#[derive(Clone)]
pub struct RedisClient {
    pub conn: ConnectionManager,
}

impl RedisClient {
    pub async fn new(redis_url: &str, connect_timeout: Duration) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| redis::RedisError::from((redis::ErrorKind::IoError, "Redis connect timed out")))??;
        Ok(RedisClient { conn })
    }
}
