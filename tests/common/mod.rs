#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use std::sync::Arc;
use std::time::Duration;

use cinema_booking::config::{BookingConfig, Config};
use cinema_booking::error::StoreError;
use cinema_booking::models::{Customer, NewTicket, Showing, Ticket};
use cinema_booking::services::booking::BookingService;
use cinema_booking::store::{MemoryStore, StoreResult, TicketStore};
use cinema_booking::AppState;

pub const SHOWING_ID: i64 = 1;

pub fn showing(id: i64, capacity: i32) -> Showing {
    Showing {
        id,
        movie_id: 100,
        hall_id: 7,
        start_time: Utc::now() + ChronoDuration::hours(2),
        capacity,
        price: 250.0,
    }
}

pub fn customer(id: i64) -> Customer {
    Customer {
        id,
        name: Name().fake(),
        email: SafeEmail().fake(),
        phone: None,
    }
}

/// Хранилище с одним сеансом и `customers` покупателями (id с 1).
pub async fn seeded_store(capacity: i32, customers: i64) -> MemoryStore {
    let store = MemoryStore::new();
    store.add_showing(showing(SHOWING_ID, capacity)).await;
    for id in 1..=customers {
        store.add_customer(customer(id)).await;
    }
    store
}

pub fn booking_service(store: &MemoryStore, config: BookingConfig) -> BookingService {
    let shared = Arc::new(store.clone());
    BookingService::new(shared.clone(), shared, config)
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/cinema_test".to_string()),
        "BOOKING_STORE_TIMEOUT_MS" => Some("1000".to_string()),
        _ => None,
    })
    .expect("test config")
}

pub fn app_state(store: &MemoryStore) -> Arc<AppState> {
    let shared = Arc::new(store.clone());
    AppState::with_stores(shared.clone(), shared, test_config())
}

/// Вставка, которая висит дольше таймаута. Остальное делегирует хранилищу.
pub struct HangingInsert(pub MemoryStore);

#[async_trait]
impl TicketStore for HangingInsert {
    async fn insert_ticket(&self, _ticket: NewTicket) -> StoreResult<Ticket> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(StoreError::Backend("unreachable".to_string()))
    }
    async fn occupied_seats(&self, showing_id: i64) -> StoreResult<Vec<u32>> {
        self.0.occupied_seats(showing_id).await
    }
    async fn seat_is_taken(&self, showing_id: i64, seat_number: u32) -> StoreResult<bool> {
        self.0.seat_is_taken(showing_id, seat_number).await
    }
    async fn get_ticket(&self, ticket_id: i64) -> StoreResult<Option<Ticket>> {
        self.0.get_ticket(ticket_id).await
    }
    async fn tickets_for_showing(&self, showing_id: i64) -> StoreResult<Vec<Ticket>> {
        self.0.tickets_for_showing(showing_id).await
    }
    async fn tickets_for_customer(&self, customer_id: i64) -> StoreResult<Vec<Ticket>> {
        self.0.tickets_for_customer(customer_id).await
    }
    async fn delete_ticket(&self, ticket_id: i64) -> StoreResult<bool> {
        self.0.delete_ticket(ticket_id).await
    }
}
