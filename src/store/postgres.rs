//! postgres.rs
//!
//! Хранилище на PostgreSQL. Безопасность бронирования держится на уникальном
//! индексе `tickets_showing_seat_uidx`: одиночный `INSERT` либо проходит, либо
//! падает с SQLSTATE 23505, сколько бы инстансов сервиса ни писали в базу.
//! Триггер `tickets_capacity_guard` в той же вставке сверяет место с
//! текущей вместимостью зала (23514).

use async_trait::async_trait;

use super::{Catalog, StoreResult, TicketStore};
use crate::database::Database;
use crate::error::StoreError;
use crate::models::{NewTicket, Showing, Ticket};

const TICKET_COLUMNS: &str = "id, showing_id, customer_id, seat_number, purchase_timestamp";

#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn seat_param(seat_number: u32) -> StoreResult<i32> {
    i32::try_from(seat_number)
        .map_err(|_| StoreError::Backend(format!("seat {} overflows INTEGER", seat_number)))
}

#[async_trait]
impl TicketStore for PgStore {
    async fn insert_ticket(&self, ticket: NewTicket) -> StoreResult<Ticket> {
        let seat = seat_param(ticket.seat_number)?;

        // Один атомарный INSERT: дубликат отсекает уникальный индекс,
        // место сверх текущей вместимости зала отсекает tickets_capacity_guard
        let created = sqlx::query_as::<_, Ticket>(&format!(
            "INSERT INTO tickets (showing_id, customer_id, seat_number)
             VALUES ($1, $2, $3)
             RETURNING {}",
            TICKET_COLUMNS
        ))
        .bind(ticket.showing_id)
        .bind(ticket.customer_id)
        .bind(seat)
        .fetch_one(&self.db.pool)
        .await?;

        Ok(created)
    }

    async fn occupied_seats(&self, showing_id: i64) -> StoreResult<Vec<u32>> {
        let seats = sqlx::query_scalar::<_, i32>(
            "SELECT seat_number FROM tickets WHERE showing_id = $1 ORDER BY seat_number"
        )
        .bind(showing_id)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(seats.into_iter().filter_map(|s| u32::try_from(s).ok()).collect())
    }

    async fn seat_is_taken(&self, showing_id: i64, seat_number: u32) -> StoreResult<bool> {
        let seat = seat_param(seat_number)?;
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tickets WHERE showing_id = $1 AND seat_number = $2)"
        )
        .bind(showing_id)
        .bind(seat)
        .fetch_one(&self.db.pool)
        .await?;

        Ok(taken)
    }

    async fn get_ticket(&self, ticket_id: i64) -> StoreResult<Option<Ticket>> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {} FROM tickets WHERE id = $1",
            TICKET_COLUMNS
        ))
        .bind(ticket_id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(ticket)
    }

    async fn tickets_for_showing(&self, showing_id: i64) -> StoreResult<Vec<Ticket>> {
        let tickets = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {} FROM tickets WHERE showing_id = $1 ORDER BY seat_number",
            TICKET_COLUMNS
        ))
        .bind(showing_id)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(tickets)
    }

    async fn tickets_for_customer(&self, customer_id: i64) -> StoreResult<Vec<Ticket>> {
        let tickets = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {} FROM tickets WHERE customer_id = $1 ORDER BY purchase_timestamp DESC, id",
            TICKET_COLUMNS
        ))
        .bind(customer_id)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(tickets)
    }

    async fn delete_ticket(&self, ticket_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(ticket_id)
            .execute(&self.db.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Catalog for PgStore {
    async fn get_showing(&self, showing_id: i64) -> StoreResult<Option<Showing>> {
        let showing = sqlx::query_as::<_, Showing>(
            "SELECT s.id, s.movie_id, s.hall_id, s.start_time, h.capacity, s.price::FLOAT8 as price
             FROM showings s
             JOIN halls h ON h.id = s.hall_id
             WHERE s.id = $1"
        )
        .bind(showing_id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(showing)
    }

    async fn showing_capacity(&self, showing_id: i64) -> StoreResult<Option<u32>> {
        let capacity = sqlx::query_scalar::<_, i32>(
            "SELECT h.capacity FROM showings s JOIN halls h ON h.id = s.hall_id WHERE s.id = $1"
        )
        .bind(showing_id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(capacity.map(|c| u32::try_from(c).unwrap_or(0)))
    }

    async fn showing_exists(&self, showing_id: i64) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM showings WHERE id = $1)"
        )
        .bind(showing_id)
        .fetch_one(&self.db.pool)
        .await?;

        Ok(exists)
    }

    async fn customer_exists(&self, customer_id: i64) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)"
        )
        .bind(customer_id)
        .fetch_one(&self.db.pool)
        .await?;

        Ok(exists)
    }
}
