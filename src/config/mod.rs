use config::ConfigError;
use serde::Deserialize;
use std::env;
use std::time::Duration;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub booking: BookingConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    /// `text` или `json`
    pub log_format: String,
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub acquire_timeout_secs: u64,
}

// Настройки Redis. Без url кеш вместимости выключен.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Option<String>,
    pub capacity_ttl_secs: u64,
    pub connect_timeout_secs: u64,
}

// Настройки транзакции бронирования
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    /// Таймаут каждого обращения к хранилищу
    pub store_timeout_ms: u64,
    /// Быстрый отказ по уже занятым местам до попытки вставки
    pub advisory_check: bool,
}

impl BookingConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: 5000,
            advisory_check: true,
        }
    }
}

// Переменная окружения -> ключ конфигурации
const ENV_KEYS: &[(&str, &str)] = &[
    ("HOST", "app.host"),
    ("PORT", "app.port"),
    ("ENVIRONMENT", "app.environment"),
    ("RUST_LOG", "app.rust_log"),
    ("LOG_FORMAT", "app.log_format"),
    ("DATABASE_URL", "database.url"),
    ("DB_POOL_SIZE", "database.pool_size"),
    ("DB_ACQUIRE_TIMEOUT_SECONDS", "database.acquire_timeout_secs"),
    ("REDIS_URL", "redis.url"),
    ("CAPACITY_CACHE_TTL_SECONDS", "redis.capacity_ttl_secs"),
    ("REDIS_CONNECT_TIMEOUT_SECONDS", "redis.connect_timeout_secs"),
    ("BOOKING_STORE_TIMEOUT_MS", "booking.store_timeout_ms"),
    ("BOOKING_ADVISORY_CHECK", "booking.advisory_check"),
];

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Собирает конфигурацию из значений по умолчанию и переменных,
    /// которые отдаёт `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 8000)?
            .set_default("app.environment", "development")?
            .set_default("app.rust_log", "cinema_booking=debug,tower_http=debug")?
            .set_default("app.log_format", "text")?
            .set_default("database.pool_size", 20)?
            .set_default("database.acquire_timeout_secs", 5)?
            .set_default("redis.capacity_ttl_secs", 300)?
            .set_default("redis.connect_timeout_secs", 5)?
            .set_default("booking.store_timeout_ms", 5000)?
            .set_default("booking.advisory_check", true)?;

        for &(var, key) in ENV_KEYS {
            builder = builder.set_override_option(key, lookup(var))?;
        }

        builder.build()?.try_deserialize()
    }
}
