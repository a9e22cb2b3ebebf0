//! Контракт хранилища записей, на который опирается бронирование.
//!
//! Единственная точка сериализации это уникальный ключ `(showing_id, seat_number)`
//! у билетов: `insert_ticket` обязан атомарно отклонить дубликат с
//! `StoreError::UniqueViolation`, независимо от числа процессов сервиса.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::error::StoreError;
use crate::models::{NewTicket, Showing, Ticket};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Билеты. Владеет долговременным представлением и ограничением уникальности.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Атомарная вставка: проверка ключа, проверка места по текущей
    /// вместимости (`StoreError::CapacityExceeded`) и запись одной операцией.
    async fn insert_ticket(&self, ticket: NewTicket) -> StoreResult<Ticket>;

    /// Номера занятых мест, по возрастанию.
    async fn occupied_seats(&self, showing_id: i64) -> StoreResult<Vec<u32>>;

    async fn seat_is_taken(&self, showing_id: i64, seat_number: u32) -> StoreResult<bool>;

    async fn get_ticket(&self, ticket_id: i64) -> StoreResult<Option<Ticket>>;

    async fn tickets_for_showing(&self, showing_id: i64) -> StoreResult<Vec<Ticket>>;

    async fn tickets_for_customer(&self, customer_id: i64) -> StoreResult<Vec<Ticket>>;

    /// Удаление записи освобождает место для новых бронирований.
    /// Возвращает `false`, если билета не было.
    async fn delete_ticket(&self, ticket_id: i64) -> StoreResult<bool>;
}

/// Внешний каталог сеансов и покупателей.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_showing(&self, showing_id: i64) -> StoreResult<Option<Showing>>;

    async fn showing_capacity(&self, showing_id: i64) -> StoreResult<Option<u32>> {
        Ok(self.get_showing(showing_id).await?.map(|s| s.seat_limit()))
    }

    async fn showing_exists(&self, showing_id: i64) -> StoreResult<bool> {
        Ok(self.get_showing(showing_id).await?.is_some())
    }

    async fn customer_exists(&self, customer_id: i64) -> StoreResult<bool>;
}

/// Ограничивает обращение к хранилищу по времени. Истёкший таймаут это
/// `StoreError::Timeout`: исход операции неизвестен.
pub async fn bounded<T, F>(timeout: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))),
    }
}
