use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{NewSale, Sale};
use crate::database::DatabaseError;

use super::parse_product_id;

pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a sale. The foreign key rejects sales for unknown products.
    pub async fn add_sale(
        &self,
        new_sale: NewSale,
        product_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Sale, DatabaseError> {
        let product_id = parse_product_id(product_id)?;

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (sale_id, product_id, quantity, paid, date_created)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING sale_id, product_id, quantity, paid, date_created
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(new_sale.quantity)
        .bind(new_sale.paid)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(sale)
    }

    /// All sales for one product, oldest first
    pub async fn list_sales(&self, product_id: &str) -> Result<Vec<Sale>, DatabaseError> {
        let product_id = parse_product_id(product_id)?;

        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT sale_id, product_id, quantity, paid, date_created
            FROM sales
            WHERE product_id = $1
            ORDER BY date_created
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}
