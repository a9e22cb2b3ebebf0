use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Покупатель нужен бронированию только как ссылка, здесь он не изменяется
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}
