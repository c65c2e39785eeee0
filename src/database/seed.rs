use chrono::Utc;
use tracing::info;

use crate::auth::{ROLE_ADMIN, ROLE_USER};
use crate::database::models::NewUser;
use crate::database::{Database, DatabaseError, UserRepository};

/// Credentials of the user `seed` creates
pub const SEED_ADMIN_EMAIL: &str = "admin@example.com";
pub const SEED_ADMIN_PASSWORD: &str = "gophers";

/// Load starter data. Running it twice leaves a single copy of each row.
pub async fn seed(db: &Database) -> Result<(), DatabaseError> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO products (name, cost, quantity, date_created, date_updated)
        SELECT 'Book', 12, 3, $1, $1
        WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = 'Book')
        "#,
    )
    .bind(Utc::now())
    .execute(db.pool())
    .await?
    .rows_affected();
    info!("Seeded {} product(s)", inserted);

    let users = UserRepository::new(db.pool().clone());
    if users.retrieve_by_email(SEED_ADMIN_EMAIL).await?.is_some() {
        info!("Seed user {} already present", SEED_ADMIN_EMAIL);
        return Ok(());
    }

    users
        .create(
            NewUser {
                name: "Admin Gopher".to_string(),
                email: SEED_ADMIN_EMAIL.to_string(),
                roles: vec![ROLE_ADMIN.to_string(), ROLE_USER.to_string()],
                password: SEED_ADMIN_PASSWORD.to_string(),
                password_confirm: SEED_ADMIN_PASSWORD.to_string(),
            },
            Utc::now(),
        )
        .await?;

    Ok(())
}
