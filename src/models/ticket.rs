use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Проданное место. Создаётся один раз успешной транзакцией бронирования и
/// больше не изменяется.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub showing_id: i64,
    pub customer_id: i64,
    pub seat_number: i32,
    pub purchase_timestamp: DateTime<Utc>,
}

/// Данные для вставки: id и время покупки назначает хранилище.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTicket {
    pub showing_id: i64,
    pub customer_id: i64,
    pub seat_number: u32,
}
