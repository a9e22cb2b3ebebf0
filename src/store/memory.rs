use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{Catalog, StoreResult, TicketStore};
use crate::error::StoreError;
use crate::models::{Customer, NewTicket, Showing, Ticket};

#[derive(Default)]
struct Inner {
    showings: HashMap<i64, Showing>,
    customers: HashMap<i64, Customer>,
    tickets: BTreeMap<i64, Ticket>,
    // уникальный индекс (showing_id, seat_number) -> ticket id
    seats: HashMap<(i64, i32), i64>,
    next_ticket_id: i64,
}

/// Хранилище в памяти процесса с той же семантикой уникального ключа, что и
/// у PostgreSQL. Подходит для тестов и локального запуска, но не для
/// нескольких инстансов сервиса.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_showing(&self, showing: Showing) {
        self.inner.lock().await.showings.insert(showing.id, showing);
    }

    pub async fn add_customer(&self, customer: Customer) {
        self.inner.lock().await.customers.insert(customer.id, customer);
    }

    /// Меняет вместимость сеанса. Как и триггер на залах, не даёт уменьшить её
    /// ниже уже проданного места.
    pub async fn resize_showing(&self, showing_id: i64, capacity: i32) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        let highest_sold = inner
            .seats
            .keys()
            .filter(|(sid, _)| *sid == showing_id)
            .map(|(_, seat)| *seat)
            .max()
            .unwrap_or(0);
        if highest_sold > capacity {
            return Err(StoreError::Backend(format!(
                "showing {} has tickets above capacity {}",
                showing_id, capacity
            )));
        }
        let showing = inner
            .showings
            .get_mut(&showing_id)
            .ok_or_else(|| StoreError::Backend(format!("showing {} does not exist", showing_id)))?;
        showing.capacity = capacity;
        Ok(())
    }

    pub async fn ticket_count(&self) -> usize {
        self.inner.lock().await.tickets.len()
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn insert_ticket(&self, ticket: NewTicket) -> StoreResult<Ticket> {
        let seat = i32::try_from(ticket.seat_number)
            .map_err(|_| StoreError::Backend(format!("seat {} overflows INTEGER", ticket.seat_number)))?;

        // Проверка и запись под одной блокировкой
        let mut inner = self.inner.lock().await;

        let Some(showing) = inner.showings.get(&ticket.showing_id) else {
            return Err(StoreError::ForeignKeyViolation(format!("showing {}", ticket.showing_id)));
        };
        // порядок как у PostgreSQL: BEFORE INSERT триггер раньше внешних ключей
        let capacity = showing.seat_limit();
        if ticket.seat_number > capacity {
            return Err(StoreError::CapacityExceeded { capacity });
        }
        if !inner.customers.contains_key(&ticket.customer_id) {
            return Err(StoreError::ForeignKeyViolation(format!("customer {}", ticket.customer_id)));
        }
        if let Some(existing) = inner.seats.get(&(ticket.showing_id, seat)) {
            return Err(StoreError::UniqueViolation(format!(
                "(showing_id, seat_number)=({}, {}) already held by ticket {}",
                ticket.showing_id, seat, existing
            )));
        }

        inner.next_ticket_id += 1;
        let created = Ticket {
            id: inner.next_ticket_id,
            showing_id: ticket.showing_id,
            customer_id: ticket.customer_id,
            seat_number: seat,
            purchase_timestamp: Utc::now(),
        };
        inner.seats.insert((created.showing_id, seat), created.id);
        inner.tickets.insert(created.id, created.clone());
        Ok(created)
    }

    async fn occupied_seats(&self, showing_id: i64) -> StoreResult<Vec<u32>> {
        let inner = self.inner.lock().await;
        let seats: BTreeSet<u32> = inner
            .seats
            .keys()
            .filter(|(sid, _)| *sid == showing_id)
            .filter_map(|(_, seat)| u32::try_from(*seat).ok())
            .collect();
        Ok(seats.into_iter().collect())
    }

    async fn seat_is_taken(&self, showing_id: i64, seat_number: u32) -> StoreResult<bool> {
        let Ok(seat) = i32::try_from(seat_number) else {
            return Ok(false);
        };
        Ok(self.inner.lock().await.seats.contains_key(&(showing_id, seat)))
    }

    async fn get_ticket(&self, ticket_id: i64) -> StoreResult<Option<Ticket>> {
        Ok(self.inner.lock().await.tickets.get(&ticket_id).cloned())
    }

    async fn tickets_for_showing(&self, showing_id: i64) -> StoreResult<Vec<Ticket>> {
        let inner = self.inner.lock().await;
        let mut tickets: Vec<Ticket> = inner
            .tickets
            .values()
            .filter(|t| t.showing_id == showing_id)
            .cloned()
            .collect();
        tickets.sort_by_key(|t| t.seat_number);
        Ok(tickets)
    }

    async fn tickets_for_customer(&self, customer_id: i64) -> StoreResult<Vec<Ticket>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .values()
            .filter(|t| t.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn delete_ticket(&self, ticket_id: i64) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        let Some(ticket) = inner.tickets.remove(&ticket_id) else {
            return Ok(false);
        };
        inner.seats.remove(&(ticket.showing_id, ticket.seat_number));
        Ok(true)
    }
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn get_showing(&self, showing_id: i64) -> StoreResult<Option<Showing>> {
        Ok(self.inner.lock().await.showings.get(&showing_id).cloned())
    }

    async fn customer_exists(&self, customer_id: i64) -> StoreResult<bool> {
        Ok(self.inner.lock().await.customers.contains_key(&customer_id))
    }
}
