use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Сеанс: фильм в зале в определённое время. capacity берётся из зала.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Showing {
    pub id: i64,
    pub movie_id: i64,
    pub hall_id: i64,
    pub start_time: DateTime<Utc>,
    pub capacity: i32,
    pub price: f64,
}

impl Showing {
    /// Вместимость как номер последнего допустимого места.
    pub fn seat_limit(&self) -> u32 {
        u32::try_from(self.capacity).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn showing(capacity: i32) -> Showing {
        Showing {
            id: 1,
            movie_id: 1,
            hall_id: 1,
            start_time: Utc::now(),
            capacity,
            price: 120.0,
        }
    }

    #[test]
    fn seat_limit_follows_capacity() {
        assert_eq!(showing(50).seat_limit(), 50);
        assert_eq!(showing(-3).seat_limit(), 0);
    }
}
