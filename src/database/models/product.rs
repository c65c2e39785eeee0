use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Something we sell, with its sales aggregated in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    #[sqlx(rename = "product_id")]
    pub id: i32,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub quantity: i32,
    pub cost: i32,
    pub sold: i64,
    pub revenue: i64,
    pub date_created: Option<DateTime<Utc>>,
    pub date_updated: Option<DateTime<Utc>>,
}

/// What clients must provide to add a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "name is a required field"))]
    pub name: String,
    #[validate(range(min = 0, message = "quantity must be 0 or greater"))]
    pub quantity: i32,
    #[validate(range(min = 1, message = "cost must be greater than 0"))]
    pub cost: i32,
}

/// Partial update: only the supplied fields change
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProduct {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "quantity must be 0 or greater"))]
    pub quantity: Option<i32>,
    #[validate(range(min = 1, message = "cost must be greater than 0"))]
    pub cost: Option<i32>,
}

impl UpdateProduct {
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(cost) = self.cost {
            product.cost = cost;
        }
    }
}
