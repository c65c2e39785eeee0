#![allow(dead_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, Connection, Executor, PgConnection};
use uuid::Uuid;

use sales_api::auth::{Authenticator, ROLE_ADMIN, ROLE_USER};
use sales_api::database::models::NewUser;
use sales_api::database::{Database, UserRepository};
use sales_api::handlers::{self, AppState};
use sales_api::metrics::Metrics;

pub const PASSWORD: &str = "gophers";
const KEY_ID: &str = "1";

/// A user created for the test, with a token fetched through the API
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// The API served in-process against its own freshly migrated database
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub db: Database,
    pub authenticator: Authenticator,
    pub admin: TestUser,
    pub user: TestUser,
    pub other: TestUser,
    admin_url: String,
    db_name: String,
}

fn key_file(name: &str) -> String {
    format!("{}/testdata/{}", env!("CARGO_MANIFEST_DIR"), name)
}

pub fn authenticator() -> Result<Authenticator> {
    Ok(Authenticator::from_key_files(
        &key_file("private.pem"),
        &key_file("public.pem"),
        KEY_ID,
        "RS256",
    )?)
}

/// Start the app, or `None` when no database is configured for tests
pub async fn spawn_app() -> Result<Option<TestApp>> {
    let admin_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping database-backed test");
            return Ok(None);
        }
    };

    // One database per test keeps tests independent
    let db_name = format!("test_{}", Uuid::new_v4().simple());
    let mut conn = PgConnection::connect(&admin_url)
        .await
        .context("connecting to DATABASE_URL")?;
    conn.execute(format!(r#"CREATE DATABASE "{}""#, db_name).as_str())
        .await
        .context("creating test database")?;
    conn.close().await?;

    let mut url = url::Url::parse(&admin_url).context("parsing DATABASE_URL")?;
    url.set_path(&format!("/{}", db_name));

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url.as_str())
        .await
        .context("connecting to test database")?;
    let db = Database::from_pool(pool);
    db.migrate().await?;

    let authenticator = authenticator()?;
    let state = AppState::new(db.clone(), std::sync::Arc::new(authenticator.clone()));
    let app = handlers::api(state, Metrics::new(), 1024 * 1024, Duration::from_secs(30));

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let mut test_app = TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        db,
        authenticator,
        admin: placeholder(),
        user: placeholder(),
        other: placeholder(),
        admin_url,
        db_name,
    };

    test_app.admin = test_app.add_user("admin", &[ROLE_ADMIN, ROLE_USER]).await?;
    test_app.user = test_app.add_user("user", &[ROLE_USER]).await?;
    test_app.other = test_app.add_user("other", &[ROLE_USER]).await?;

    Ok(Some(test_app))
}

fn placeholder() -> TestUser {
    TestUser {
        id: Uuid::nil(),
        email: String::new(),
        token: String::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn add_user(&self, name: &str, roles: &[&str]) -> Result<TestUser> {
        let email = format!("{}@example.com", name);
        let user = UserRepository::new(self.db.pool().clone())
            .create(
                NewUser {
                    name: name.to_string(),
                    email: email.clone(),
                    roles: roles.iter().map(|r| r.to_string()).collect(),
                    password: PASSWORD.to_string(),
                    password_confirm: PASSWORD.to_string(),
                },
                Utc::now(),
            )
            .await?;

        let token = self.token(&email, PASSWORD).await?;
        Ok(TestUser {
            id: user.id,
            email,
            token,
        })
    }

    /// Fetch a token through GET /v1/user/token
    pub async fn token(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .get(self.url("/v1/user/token"))
            .basic_auth(email, Some(password))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "token request failed: {}", res.status());

        let body: Value = res.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("token missing from response")
    }

    /// Create a product as `token`'s subject and return its JSON
    pub async fn create_product(&self, token: &str, body: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/v1/products"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        Ok(res.json().await?)
    }

    pub async fn cleanup(self) -> Result<()> {
        self.db.close().await;

        let mut conn = PgConnection::connect(&self.admin_url).await?;
        conn.execute(format!(r#"DROP DATABASE IF EXISTS "{}" WITH (FORCE)"#, self.db_name).as_str())
            .await?;
        conn.close().await?;
        Ok(())
    }
}
