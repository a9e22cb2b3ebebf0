pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod redis_client;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::cache::CachedCatalog;
use crate::services::booking::BookingService;
use crate::store::{Catalog, PgStore, TicketStore};

// Shared state передаётся хендлерам через axum State, никаких глобальных синглтонов
#[derive(Clone)]
pub struct AppState {
    pub booking: BookingService,
    pub config: config::Config,
}

impl AppState {
    /// Подключает PostgreSQL (и Redis, если задан) и собирает сервис бронирования.
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database).await?;
        info!("Database connected");

        db.run_migrations().await?;

        let redis = match config.redis.url.as_deref() {
            Some(url) => match redis_client::RedisClient::new(url, Duration::from_secs(config.redis.connect_timeout_secs)).await {
                Ok(client) => {
                    info!("Redis connected, capacity cache enabled");
                    Some(client)
                }
                Err(e) => {
                    // без кеша работаем напрямую с базой
                    warn!("Redis unavailable, capacity cache disabled: {:?}", e);
                    None
                }
            },
            None => None,
        };

        let store = PgStore::new(db);
        let catalog = CachedCatalog::new(store.clone(), redis, config.redis.capacity_ttl_secs);
        if !catalog.is_enabled() {
            info!("Capacity cache disabled, reading capacity from the database");
        }

        Ok(Self::with_stores(Arc::new(store), Arc::new(catalog), config))
    }

    pub fn with_stores(
        tickets: Arc<dyn TicketStore>,
        catalog: Arc<dyn Catalog>,
        config: config::Config,
    ) -> Arc<Self> {
        let booking = BookingService::new(tickets, catalog, config.booking.clone());
        Arc::new(Self { booking, config })
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Cinema Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
