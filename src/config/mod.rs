use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

/// Connection target for the products database
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub require_tls: bool,
    pub max_connections: u32,
    /// How long to wait for a pooled connection. Keep it below the server's
    /// request timeout so a dead database is reported, not timed out.
    pub connect_timeout_secs: u64,
}

// Hand-written so the password never reaches the logs
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("require_tls", &self.require_tls)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: String,
    pub debug_addr: String,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    pub shutdown_grace_secs: u64,
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Upper bound for a whole request, taken as the larger of the read and write timeouts
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs.max(self.write_timeout_secs))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub key_id: String,
    pub private_key_file: String,
    pub public_key_file: String,
    pub algorithm: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        // Pick up a local .env so `cargo run` sees SALES_* without exporting them
        let _ = dotenvy::dotenv();

        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("SALES_DB_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("SALES_DB_PASSWORD") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("SALES_DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("SALES_DB_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("SALES_DB_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("SALES_DB_REQUIRE_TLS") {
            self.database.require_tls = v.parse().unwrap_or(self.database.require_tls);
        }
        if let Ok(v) = env::var("SALES_DB_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("SALES_DB_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }

        // Server overrides
        if let Ok(v) = env::var("SALES_SERVER_ADDR") {
            self.server.addr = v;
        }
        if let Ok(v) = env::var("SALES_SERVER_DEBUG_ADDR") {
            self.server.debug_addr = v;
        }
        if let Ok(v) = env::var("SALES_SERVER_READ_TIMEOUT_SECS") {
            self.server.read_timeout_secs = v.parse().unwrap_or(self.server.read_timeout_secs);
        }
        if let Ok(v) = env::var("SALES_SERVER_WRITE_TIMEOUT_SECS") {
            self.server.write_timeout_secs = v.parse().unwrap_or(self.server.write_timeout_secs);
        }
        if let Ok(v) = env::var("SALES_SERVER_SHUTDOWN_GRACE_SECS") {
            self.server.shutdown_grace_secs = v.parse().unwrap_or(self.server.shutdown_grace_secs);
        }
        if let Ok(v) = env::var("SALES_SERVER_MAX_BODY_BYTES") {
            self.server.max_body_bytes = v.parse().unwrap_or(self.server.max_body_bytes);
        }

        // Auth overrides
        if let Ok(v) = env::var("SALES_AUTH_KEY_ID") {
            self.auth.key_id = v;
        }
        if let Ok(v) = env::var("SALES_AUTH_PRIVATE_KEY_FILE") {
            self.auth.private_key_file = v;
        }
        if let Ok(v) = env::var("SALES_AUTH_PUBLIC_KEY_FILE") {
            self.auth.public_key_file = v;
        }
        if let Ok(v) = env::var("SALES_AUTH_ALGORITHM") {
            self.auth.algorithm = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                user: "postgres".to_string(),
                password: "postgres".to_string(),
                host: "localhost".to_string(),
                port: 5432,
                name: "postgres".to_string(),
                require_tls: false,
                max_connections: 10,
                connect_timeout_secs: 3,
            },
            server: ServerConfig {
                addr: "0.0.0.0:3020".to_string(),
                debug_addr: "127.0.0.1:6060".to_string(),
                read_timeout_secs: 5,
                write_timeout_secs: 5,
                shutdown_grace_secs: 5,
                max_body_bytes: 1024 * 1024, // 1MB
            },
            auth: AuthConfig {
                key_id: "1".to_string(),
                private_key_file: "private.pem".to_string(),
                public_key_file: "public.pem".to_string(),
                algorithm: "RS256".to_string(),
            },
        }
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.require_tls = true;
        config.database.max_connections = 50;
        config
    }
}

// Global singleton config - initialized once at startup by the binaries
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
