//! inventory.rs
//!
//! Складывает занятые и свободные места сеанса из уже выданных билетов.
//! Только читает: результат совещательный и может устареть к моменту
//! бронирования, резервировать места этот модуль не умеет.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{BookingError, Entity};
use crate::store::{bounded, Catalog, TicketStore};

/// Снимок доступности мест сеанса.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatMap {
    pub showing_id: i64,
    pub capacity: u32,
    pub occupied: Vec<u32>,
    pub available: u32,
}

#[derive(Clone)]
pub struct SeatInventory {
    tickets: Arc<dyn TicketStore>,
    catalog: Arc<dyn Catalog>,
    timeout: Duration,
}

impl SeatInventory {
    pub fn new(tickets: Arc<dyn TicketStore>, catalog: Arc<dyn Catalog>, timeout: Duration) -> Self {
        Self { tickets, catalog, timeout }
    }

    /// Все занятые места сеанса по возрастанию. Для неизвестного сеанса пусто.
    pub async fn occupied_seats(&self, showing_id: i64) -> Result<Vec<u32>, BookingError> {
        let mut seats = bounded(self.timeout, self.tickets.occupied_seats(showing_id)).await?;
        // хранилище обещает порядок, но снимок должен быть детерминированным в любом случае
        seats.sort_unstable();
        seats.dedup();
        Ok(seats)
    }

    pub async fn is_available(&self, showing_id: i64, seat_number: u32) -> Result<bool, BookingError> {
        let capacity = self.capacity(showing_id).await?;
        if seat_number == 0 || seat_number > capacity {
            return Ok(false);
        }
        let taken = bounded(self.timeout, self.tickets.seat_is_taken(showing_id, seat_number)).await?;
        Ok(!taken)
    }

    pub async fn available_count(&self, showing_id: i64) -> Result<u32, BookingError> {
        Ok(self.availability(showing_id).await?.available)
    }

    pub async fn availability(&self, showing_id: i64) -> Result<SeatMap, BookingError> {
        let capacity = self.capacity(showing_id).await?;
        let occupied = self.occupied_seats(showing_id).await?;
        let sold = u32::try_from(occupied.len()).unwrap_or(u32::MAX);

        Ok(SeatMap {
            showing_id,
            capacity,
            available: capacity.saturating_sub(sold),
            occupied,
        })
    }

    pub(crate) async fn capacity(&self, showing_id: i64) -> Result<u32, BookingError> {
        bounded(self.timeout, self.catalog.showing_capacity(showing_id))
            .await?
            .ok_or(BookingError::NotFound(Entity::Showing(showing_id)))
    }
}
