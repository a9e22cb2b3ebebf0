//! booking.rs
//!
//! Транзакция бронирования: единственный путь, которым создаётся билет.
//!
//! Порядок работы:
//! 1.  **Validating**: вместимость сеанса (или `NotFound`), диапазон места
//!     (`SeatOutOfRange` до любой записи), существование покупателя.
//! 2.  **Reserving**: необязательная совещательная проверка занятости, затем
//!     один атомарный `insert_ticket`. Корректность держится только на
//!     хранилище: уникальный индекс против двойной продажи и проверка
//!     текущей вместимости при вставке. Совещательная проверка лишь экономит
//!     поход в базу за заведомо занятым местом.
//! 3.  Терминальные состояния: `Confirmed` или `Rejected(..)`. Повторов внутри
//!     транзакции нет, выбор другого места это забота вызывающего.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::BookingConfig;
use crate::error::{BookingError, Entity, StoreError};
use crate::models::{NewTicket, Ticket};
use crate::services::inventory::SeatInventory;
use crate::store::{bounded, Catalog, TicketStore};

/// Фаза попытки бронирования, пишется в логи на каждом переходе.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingPhase {
    Validating,
    Reserving,
    Confirmed,
    Rejected(&'static str),
}

impl fmt::Display for BookingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingPhase::Validating => f.write_str("Validating"),
            BookingPhase::Reserving => f.write_str("Reserving"),
            BookingPhase::Confirmed => f.write_str("Confirmed"),
            BookingPhase::Rejected(kind) => write!(f, "Rejected({})", kind),
        }
    }
}

#[derive(Clone)]
pub struct BookingService {
    tickets: Arc<dyn TicketStore>,
    catalog: Arc<dyn Catalog>,
    inventory: SeatInventory,
    config: BookingConfig,
}

impl BookingService {
    pub fn new(tickets: Arc<dyn TicketStore>, catalog: Arc<dyn Catalog>, config: BookingConfig) -> Self {
        let inventory = SeatInventory::new(tickets.clone(), catalog.clone(), config.store_timeout());
        Self { tickets, catalog, inventory, config }
    }

    pub fn inventory(&self) -> &SeatInventory {
        &self.inventory
    }

    /// Бронирует место `seat_number` сеанса `showing_id` для покупателя.
    ///
    /// Из всех параллельных вызовов с одной парой `(showing_id, seat_number)`
    /// успешен максимум один, остальные получают `SeatTaken`. При
    /// `StoreUnavailable` исход неизвестен: перед новой попыткой нужно заново
    /// проверить доступность места.
    #[tracing::instrument(skip(self), fields(attempt_id = %Uuid::new_v4()))]
    pub async fn book_seat(
        &self,
        showing_id: i64,
        customer_id: i64,
        seat_number: u32,
    ) -> Result<Ticket, BookingError> {
        debug!(phase = %BookingPhase::Validating);
        let result = self.try_book(showing_id, customer_id, seat_number).await;

        match &result {
            Ok(ticket) => {
                info!(phase = %BookingPhase::Confirmed, ticket_id = ticket.id, "Seat booked");
            }
            Err(BookingError::StoreUnavailable(reason)) => {
                warn!(phase = %BookingPhase::Rejected("StoreUnavailable"), %reason, "Booking outcome unknown");
            }
            Err(e) => {
                info!(phase = %BookingPhase::Rejected(e.kind()), "Booking rejected: {}", e);
            }
        }
        result
    }

    async fn try_book(&self, showing_id: i64, customer_id: i64, seat_number: u32) -> Result<Ticket, BookingError> {
        let timeout = self.config.store_timeout();

        // 1) Validating
        let capacity = self.inventory.capacity(showing_id).await?;
        if seat_number == 0 || seat_number > capacity {
            return Err(BookingError::SeatOutOfRange { seat: seat_number, capacity });
        }
        if !bounded(timeout, self.catalog.customer_exists(customer_id)).await? {
            return Err(BookingError::NotFound(Entity::Customer(customer_id)));
        }

        // 2) Reserving
        debug!(phase = %BookingPhase::Reserving);
        if self.config.advisory_check
            && bounded(timeout, self.tickets.seat_is_taken(showing_id, seat_number)).await?
        {
            return Err(BookingError::SeatTaken { showing_id, seat: seat_number });
        }

        let new_ticket = NewTicket { showing_id, customer_id, seat_number };
        match bounded(timeout, self.tickets.insert_ticket(new_ticket)).await {
            Ok(ticket) => Ok(ticket),
            // проигранная гонка, а не испорченное состояние
            Err(StoreError::UniqueViolation(_)) => Err(BookingError::SeatTaken { showing_id, seat: seat_number }),
            // вместимость из каталога устарела, зал уже меньше
            Err(StoreError::CapacityExceeded { capacity }) => {
                Err(BookingError::SeatOutOfRange { seat: seat_number, capacity })
            }
            // сеанс или покупатель исчезли между проверкой и вставкой
            Err(StoreError::ForeignKeyViolation(detail)) => {
                let entity = if detail.contains("customer") {
                    Entity::Customer(customer_id)
                } else {
                    Entity::Showing(showing_id)
                };
                Err(BookingError::NotFound(entity))
            }
            Err(StoreError::Timeout(ms)) => Err(BookingError::StoreUnavailable(format!(
                "insert did not complete within {} ms, reservation state unknown",
                ms
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_ticket(&self, ticket_id: i64) -> Result<Ticket, BookingError> {
        bounded(self.config.store_timeout(), self.tickets.get_ticket(ticket_id))
            .await?
            .ok_or(BookingError::NotFound(Entity::Ticket(ticket_id)))
    }

    pub async fn showing_tickets(&self, showing_id: i64) -> Result<Vec<Ticket>, BookingError> {
        let timeout = self.config.store_timeout();
        if !bounded(timeout, self.catalog.showing_exists(showing_id)).await? {
            return Err(BookingError::NotFound(Entity::Showing(showing_id)));
        }
        Ok(bounded(timeout, self.tickets.tickets_for_showing(showing_id)).await?)
    }

    pub async fn customer_tickets(&self, customer_id: i64) -> Result<Vec<Ticket>, BookingError> {
        let timeout = self.config.store_timeout();
        if !bounded(timeout, self.catalog.customer_exists(customer_id)).await? {
            return Err(BookingError::NotFound(Entity::Customer(customer_id)));
        }
        Ok(bounded(timeout, self.tickets.tickets_for_customer(customer_id)).await?)
    }

    /// Удаление записи билета. Место снова становится доступным.
    pub async fn delete_ticket(&self, ticket_id: i64) -> Result<(), BookingError> {
        let deleted = bounded(self.config.store_timeout(), self.tickets.delete_ticket(ticket_id)).await?;
        if !deleted {
            return Err(BookingError::NotFound(Entity::Ticket(ticket_id)));
        }
        info!("Ticket {} deleted, seat released", ticket_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, Showing};
    use crate::store::MemoryStore;
    use chrono::Utc;

    async fn service_with(capacity: i32, advisory_check: bool) -> (BookingService, MemoryStore) {
        let store = MemoryStore::new();
        store
            .add_showing(Showing {
                id: 1,
                movie_id: 1,
                hall_id: 1,
                start_time: Utc::now(),
                capacity,
                price: 180.0,
            })
            .await;
        for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
            store
                .add_customer(Customer {
                    id,
                    name: name.to_string(),
                    email: format!("{}@example.com", name),
                    phone: None,
                })
                .await;
        }
        let shared = Arc::new(store.clone());
        let config = BookingConfig { store_timeout_ms: 1000, advisory_check };
        (BookingService::new(shared.clone(), shared, config), store)
    }

    #[tokio::test]
    async fn alice_bob_carol_scenario() {
        let (service, _) = service_with(50, true).await;

        let ticket = service.book_seat(1, 1, 15).await.unwrap();
        assert_eq!(ticket.seat_number, 15);
        assert_eq!(ticket.customer_id, 1);
        assert!(!service.inventory().is_available(1, 15).await.unwrap());

        let err = service.book_seat(1, 2, 15).await.unwrap_err();
        assert!(matches!(err, BookingError::SeatTaken { showing_id: 1, seat: 15 }));

        let err = service.book_seat(1, 3, 51).await.unwrap_err();
        assert!(matches!(err, BookingError::SeatOutOfRange { seat: 51, capacity: 50 }));
    }

    #[tokio::test]
    async fn unique_index_rejects_when_advisory_check_is_off() {
        let (service, store) = service_with(10, false).await;

        service.book_seat(1, 1, 7).await.unwrap();
        let err = service.book_seat(1, 2, 7).await.unwrap_err();
        assert!(matches!(err, BookingError::SeatTaken { .. }));
        assert_eq!(store.ticket_count().await, 1);
    }

    #[tokio::test]
    async fn seat_zero_is_out_of_range_and_writes_nothing() {
        let (service, store) = service_with(10, true).await;

        let err = service.book_seat(1, 1, 0).await.unwrap_err();
        assert!(matches!(err, BookingError::SeatOutOfRange { seat: 0, capacity: 10 }));
        assert_eq!(store.ticket_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_entities_are_not_found() {
        let (service, _) = service_with(10, true).await;

        let err = service.book_seat(9, 1, 1).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(Entity::Showing(9))));

        let err = service.book_seat(1, 9, 1).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(Entity::Customer(9))));
    }

    #[tokio::test]
    async fn deleted_ticket_reopens_seat() {
        let (service, _) = service_with(10, true).await;

        let ticket = service.book_seat(1, 1, 2).await.unwrap();
        service.delete_ticket(ticket.id).await.unwrap();
        assert!(service.inventory().is_available(1, 2).await.unwrap());

        let again = service.book_seat(1, 2, 2).await.unwrap();
        assert_eq!(again.customer_id, 2);

        let err = service.delete_ticket(ticket.id).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(Entity::Ticket(_))));
    }

    #[tokio::test]
    async fn customer_and_showing_ticket_listings() {
        let (service, _) = service_with(10, true).await;
        service.book_seat(1, 1, 5).await.unwrap();
        service.book_seat(1, 1, 3).await.unwrap();
        service.book_seat(1, 2, 1).await.unwrap();

        let alice = service.customer_tickets(1).await.unwrap();
        assert_eq!(alice.len(), 2);

        let seats: Vec<i32> = service
            .showing_tickets(1)
            .await
            .unwrap()
            .iter()
            .map(|t| t.seat_number)
            .collect();
        assert_eq!(seats, vec![1, 3, 5]);

        assert!(service.customer_tickets(77).await.is_err());
    }

    #[test]
    fn phase_display() {
        assert_eq!(BookingPhase::Rejected("SeatTaken").to_string(), "Rejected(SeatTaken)");
        assert_eq!(BookingPhase::Reserving.to_string(), "Reserving");
    }
}
