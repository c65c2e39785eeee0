use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{Claims, TOKEN_TTL_HOURS};
use crate::database::models::{NewUser, User};
use crate::database::DatabaseError;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate and insert a user, storing only the password hash
    pub async fn create(&self, new_user: NewUser, now: DateTime<Utc>) -> Result<User, DatabaseError> {
        new_user.validate()?;
        let password_hash = hash_password(&new_user.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, name, email, roles, password_hash, date_created, date_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING user_id, name, email, roles, password_hash, date_created, date_updated
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.roles)
        .bind(&password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Created user {} <{}>", user.id, user.email);
        Ok(user)
    }

    pub async fn retrieve_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, roles, password_hash, date_created, date_updated
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check credentials and build claims issued at `now`. An unknown email and
    /// a wrong password fail the same way.
    pub async fn authenticate(
        &self,
        now: DateTime<Utc>,
        email: &str,
        password: &str,
    ) -> Result<Claims, DatabaseError> {
        let user = self
            .retrieve_by_email(email)
            .await?
            .ok_or(DatabaseError::AuthenticationFailure)?;

        if !verify_password(password, &user.password_hash) {
            return Err(DatabaseError::AuthenticationFailure);
        }

        Ok(Claims::new(
            user.id.to_string(),
            user.roles,
            now,
            Duration::hours(TOKEN_TTL_HOURS),
        ))
    }
}

pub fn hash_password(password: &str) -> Result<String, DatabaseError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DatabaseError::PasswordHash(e.to_string()))
}

/// A malformed stored hash verifies nothing
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_their_password() {
        let hash = hash_password("gophers").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("gophers", &hash));
        assert!(!verify_password("gopher", &hash));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        assert_ne!(hash_password("gophers").unwrap(), hash_password("gophers").unwrap());
    }

    #[tokio::test]
    async fn create_rejects_mismatched_confirmation_before_any_query() {
        let repo = UserRepository::new(crate::testing::unreachable_database().pool().clone());
        let new_user = NewUser {
            name: "Ilia".to_string(),
            email: "ilia@example.com".to_string(),
            roles: vec!["USER".to_string()],
            password: "gophers".to_string(),
            password_confirm: "gopher".to_string(),
        };

        match repo.create(new_user, Utc::now()).await {
            Err(DatabaseError::InvalidUser(errors)) => {
                assert!(errors.field_errors().contains_key("password_confirm"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("gophers", "not-a-phc-string"));
    }
}
