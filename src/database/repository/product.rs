use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Claims;
use crate::database::models::{NewProduct, Product, UpdateProduct};
use crate::database::DatabaseError;

use super::parse_product_id;

const LIST_PRODUCTS: &str = r#"
    SELECT
        p.product_id, p.user_id, p.name, p.cost, p.quantity,
        COALESCE(SUM(s.quantity), 0) AS sold,
        COALESCE(SUM(s.paid), 0) AS revenue,
        p.date_created, p.date_updated
    FROM products AS p
    LEFT JOIN sales AS s ON p.product_id = s.product_id
    GROUP BY p.product_id
    ORDER BY p.product_id
"#;

const RETRIEVE_PRODUCT: &str = r#"
    SELECT
        p.product_id, p.user_id, p.name, p.cost, p.quantity,
        COALESCE(SUM(s.quantity), 0) AS sold,
        COALESCE(SUM(s.paid), 0) AS revenue,
        p.date_created, p.date_updated
    FROM products AS p
    LEFT JOIN sales AS s ON p.product_id = s.product_id
    WHERE p.product_id = $1
    GROUP BY p.product_id
"#;

/// Persistence for products; every read folds in sold/revenue from sales
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Product>, DatabaseError> {
        let products = sqlx::query_as::<_, Product>(LIST_PRODUCTS)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn retrieve(&self, id: &str) -> Result<Product, DatabaseError> {
        let id = parse_product_id(id)?;

        sqlx::query_as::<_, Product>(RETRIEVE_PRODUCT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound("product"))
    }

    /// Insert a product owned by the token's subject
    pub async fn create(
        &self,
        claims: &Claims,
        new_product: NewProduct,
        now: DateTime<Utc>,
    ) -> Result<Product, DatabaseError> {
        let owner = Uuid::parse_str(&claims.sub).map_err(|_| DatabaseError::Forbidden)?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (user_id, name, cost, quantity, date_created, date_updated)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING product_id, user_id, name, cost, quantity,
                      0::BIGINT AS sold, 0::BIGINT AS revenue,
                      date_created, date_updated
            "#,
        )
        .bind(owner)
        .bind(&new_product.name)
        .bind(new_product.cost)
        .bind(new_product.quantity)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created product {} for {}", product.id, owner);
        Ok(product)
    }

    /// Apply the supplied fields; only admins and the owner may do this
    pub async fn update(
        &self,
        claims: &Claims,
        id: &str,
        update: UpdateProduct,
        now: DateTime<Utc>,
    ) -> Result<Product, DatabaseError> {
        let mut product = self.retrieve(id).await?;

        if !claims.is_admin() && !is_owner(&product, claims) {
            return Err(DatabaseError::Forbidden);
        }

        update.apply_to(&mut product);

        let date_updated: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET name = $2, cost = $3, quantity = $4, date_updated = $5
            WHERE product_id = $1
            RETURNING date_updated
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.cost)
        .bind(product.quantity)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::NotFound("product"))?;

        product.date_updated = date_updated;
        Ok(product)
    }

    /// Removing a product that does not exist is not an error
    pub async fn delete(&self, id: &str) -> Result<(), DatabaseError> {
        let id = parse_product_id(id)?;

        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Deleted product {} ({} rows)", id, result.rows_affected());
        Ok(())
    }
}

fn is_owner(product: &Product, claims: &Claims) -> bool {
    match (product.user_id, Uuid::parse_str(&claims.sub)) {
        (Some(owner), Ok(subject)) => owner == subject,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ROLE_USER;

    fn product(owner: Option<Uuid>) -> Product {
        Product {
            id: 1,
            user_id: owner,
            name: "Book".to_string(),
            quantity: 3,
            cost: 12,
            sold: 0,
            revenue: 0,
            date_created: None,
            date_updated: None,
        }
    }

    fn claims(sub: &str) -> Claims {
        Claims::new(sub, vec![ROLE_USER.to_string()], Utc::now(), chrono::Duration::hours(1))
    }

    #[test]
    fn owner_matches_subject() {
        let id = Uuid::new_v4();
        assert!(is_owner(&product(Some(id)), &claims(&id.to_string())));
        assert!(!is_owner(&product(Some(id)), &claims(&Uuid::new_v4().to_string())));
    }

    #[test]
    fn unowned_products_have_no_owner() {
        let id = Uuid::new_v4();
        assert!(!is_owner(&product(None), &claims(&id.to_string())));
        assert!(!is_owner(&product(Some(id)), &claims("not-a-uuid")));
    }
}
