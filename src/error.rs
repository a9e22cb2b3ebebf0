//! error.rs
//!
//! Типы ошибок ядра бронирования.
//!
//! - `StoreError` описывает отказы хранилища (нарушение уникальности, таймаут, I/O).
//! - `BookingError` то, что видит вызывающий `book_seat`. Все варианты
//!   возвращаются как есть, ничего не проглатывается.

use sqlx::postgres::PgDatabaseError;
use std::fmt;
use thiserror::Error;

/// Имя ограничения, которым триггер `tickets_capacity_guard` помечает отказ.
pub const CAPACITY_CONSTRAINT: &str = "tickets_seat_within_capacity";

/// Сущность, которую не удалось найти при валидации бронирования.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Showing(i64),
    Customer(i64),
    Ticket(i64),
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Showing(id) => write!(f, "showing {}", id),
            Entity::Customer(id) => write!(f, "customer {}", id),
            Entity::Ticket(id) => write!(f, "ticket {}", id),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Запись нарушила ограничение уникальности `(showing_id, seat_number)`.
    #[error("unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Место за пределами текущей вместимости зала на момент записи.
    #[error("seat exceeds current capacity {capacity}")]
    CapacityExceeded { capacity: u32 },

    #[error("store call timed out after {0} ms")]
    Timeout(u64),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                // SQLSTATE: https://www.postgresql.org/docs/current/errcodes-appendix.html
                match db_err.code().as_deref() {
                    Some("23505") => StoreError::UniqueViolation(db_err.message().to_string()),
                    Some("23503") => StoreError::ForeignKeyViolation(db_err.message().to_string()),
                    Some("23514") if db_err.constraint() == Some(CAPACITY_CONSTRAINT) => {
                        // триггер кладёт текущую вместимость в DETAIL
                        let capacity = db_err
                            .try_downcast_ref::<PgDatabaseError>()
                            .and_then(|pg| pg.detail())
                            .and_then(|detail| detail.trim().parse().ok())
                            .unwrap_or(0);
                        StoreError::CapacityExceeded { capacity }
                    }
                    Some(code) => StoreError::Backend(format!("[{}] {}", code, db_err.message())),
                    None => StoreError::Backend(db_err.message().to_string()),
                }
            }
            sqlx::Error::PoolTimedOut => StoreError::Backend("connection pool timed out".to_string()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("seat {seat} is out of range 1..={capacity}")]
    SeatOutOfRange { seat: u32, capacity: u32 },

    #[error("seat {seat} is already taken for showing {showing_id}")]
    SeatTaken { showing_id: i64, seat: u32 },

    #[error("{0} not found")]
    NotFound(Entity),

    /// Исход неизвестен: место могло быть, а могло не быть занято.
    /// Перед новой попыткой нужно заново проверить доступность.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl BookingError {
    /// Короткий машиночитаемый код для ответов API.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::SeatOutOfRange { .. } => "SeatOutOfRange",
            BookingError::SeatTaken { .. } => "SeatTaken",
            BookingError::NotFound(_) => "NotFound",
            BookingError::StoreUnavailable(_) => "StoreUnavailable",
        }
    }
}

impl From<StoreError> for BookingError {
    // UniqueViolation здесь не маппится: для него нужен контекст (сеанс и место),
    // это делает сама транзакция бронирования.
    fn from(err: StoreError) -> Self {
        BookingError::StoreUnavailable(err.to_string())
    }
}
