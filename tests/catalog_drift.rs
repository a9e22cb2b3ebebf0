//! Каталог расходится с хранилищем: устаревшая вместимость, исчезнувшие
//! сеанс или покупатель. Решение всё равно принимает вставка.

mod common;

use async_trait::async_trait;
use std::sync::Arc;

use cinema_booking::config::BookingConfig;
use cinema_booking::error::{BookingError, Entity};
use cinema_booking::models::Showing;
use cinema_booking::services::booking::BookingService;
use cinema_booking::store::{Catalog, MemoryStore, StoreResult};

use common::{seeded_store, showing, SHOWING_ID};

/// Отдаёт вместимость, закешированную до уменьшения зала.
struct StaleCapacity {
    store: MemoryStore,
    capacity: u32,
}

#[async_trait]
impl Catalog for StaleCapacity {
    async fn get_showing(&self, showing_id: i64) -> StoreResult<Option<Showing>> {
        self.store.get_showing(showing_id).await
    }
    async fn showing_capacity(&self, showing_id: i64) -> StoreResult<Option<u32>> {
        Ok(self.store.get_showing(showing_id).await?.map(|_| self.capacity))
    }
    async fn customer_exists(&self, customer_id: i64) -> StoreResult<bool> {
        self.store.customer_exists(customer_id).await
    }
}

/// Подтверждает любой сеанс и любого покупателя, даже если записи уже нет.
struct Vanished;

#[async_trait]
impl Catalog for Vanished {
    async fn get_showing(&self, showing_id: i64) -> StoreResult<Option<Showing>> {
        Ok(Some(showing(showing_id, 50)))
    }
    async fn customer_exists(&self, _customer_id: i64) -> StoreResult<bool> {
        Ok(true)
    }
}

fn service(store: &MemoryStore, catalog: Arc<dyn Catalog>, advisory_check: bool) -> BookingService {
    let config = BookingConfig { advisory_check, ..BookingConfig::default() };
    BookingService::new(Arc::new(store.clone()), catalog, config)
}

#[tokio::test]
async fn stale_capacity_cannot_sell_past_shrunken_hall() {
    let store = seeded_store(50, 2).await;
    store.resize_showing(SHOWING_ID, 10).await.unwrap();
    let catalog = Arc::new(StaleCapacity { store: store.clone(), capacity: 50 });
    let service = service(&store, catalog, true);

    let err = service.book_seat(SHOWING_ID, 1, 45).await.unwrap_err();
    assert!(matches!(err, BookingError::SeatOutOfRange { seat: 45, capacity: 10 }));
    assert_eq!(store.ticket_count().await, 0);

    // в пределах нового зала бронирование проходит
    let ticket = service.book_seat(SHOWING_ID, 2, 10).await.unwrap();
    assert_eq!(ticket.seat_number, 10);
    assert_eq!(store.ticket_count().await, 1);
}

#[tokio::test]
async fn stale_capacity_keeps_ticket_count_within_hall() {
    let store = seeded_store(50, 12).await;
    store.resize_showing(SHOWING_ID, 5).await.unwrap();
    let catalog = Arc::new(StaleCapacity { store: store.clone(), capacity: 50 });
    let service = service(&store, catalog, false);

    for customer_id in 1..=12i64 {
        let seat = u32::try_from(customer_id).unwrap();
        let _ = service.book_seat(SHOWING_ID, customer_id, seat).await;
    }

    assert_eq!(store.ticket_count().await, 5);
    assert_eq!(
        service.inventory().occupied_seats(SHOWING_ID).await.unwrap(),
        vec![1, 2, 3, 4, 5]
    );
}

#[tokio::test]
async fn customer_removed_before_insert_is_not_found() {
    let store = seeded_store(50, 1).await;
    let service = service(&store, Arc::new(Vanished), false);

    let err = service.book_seat(SHOWING_ID, 99, 3).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(Entity::Customer(99))));
    assert_eq!(store.ticket_count().await, 0);
}

#[tokio::test]
async fn showing_removed_before_insert_is_not_found() {
    let store = seeded_store(50, 1).await;
    let service = service(&store, Arc::new(Vanished), false);

    let err = service.book_seat(5, 1, 3).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(Entity::Showing(5))));
    assert_eq!(store.ticket_count().await, 0);
}
