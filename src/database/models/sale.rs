use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A recorded transaction for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Sale {
    #[sqlx(rename = "sale_id")]
    pub id: Uuid,
    pub product_id: i32,
    pub quantity: i32,
    pub paid: i32,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewSale {
    #[validate(range(min = 1, message = "quantity must be greater than 0"))]
    pub quantity: i32,
    #[validate(range(min = 1, message = "paid must be greater than 0"))]
    pub paid: i32,
}
