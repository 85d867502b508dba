//! Server configuration and environment loading.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::warn;

use crate::inbound::http::session::TokenConfig;
use crate::outbound::persistence::{DbPool, PoolConfig};

/// Settings read from the process environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Socket address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Signing secret for access tokens.
    pub access_secret: String,
    /// Signing secret for refresh tokens.
    pub refresh_secret: String,
    /// Whether session cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
    /// Upper bound on pooled database connections.
    pub max_connections: u32,
}

fn secret_from_env(name: &str) -> std::io::Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ if cfg!(debug_assertions) => {
            warn!(variable = name, "using ephemeral signing secret (dev only)");
            Ok(uuid::Uuid::new_v4().simple().to_string())
        }
        _ => Err(std::io::Error::other(format!("{name} must be set"))),
    }
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when a required variable is missing or a
    /// value fails to parse. In debug builds missing token secrets fall back
    /// to ephemeral values.
    pub fn from_env() -> std::io::Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| std::io::Error::other("DATABASE_URL must be set"))?;
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".into())
            .parse()
            .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;
        let access_secret = secret_from_env("JWT_ACCESS_SECRET")?;
        let refresh_secret = secret_from_env("JWT_REFRESH_SECRET")?;
        let cookie_secure = env::var("COOKIE_SECURE").map(|v| v != "0").unwrap_or(true);
        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| std::io::Error::other(format!("invalid DATABASE_MAX_CONNECTIONS: {e}")))?,
            Err(_) => 10,
        };
        Ok(Self {
            database_url,
            bind_addr,
            access_secret,
            refresh_secret,
            cookie_secure,
            max_connections,
        })
    }

    /// Pool configuration derived from these settings.
    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(&self.database_url)
            .with_max_size(self.max_connections)
            .with_connection_timeout(Duration::from_secs(30))
    }

    /// Token configuration derived from these settings.
    #[must_use]
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::new(
            self.access_secret.clone(),
            self.refresh_secret.clone(),
            self.cookie_secure,
        )
    }
}

/// Pre-built inputs for [`create_server`](super::create_server).
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) tokens: TokenConfig,
    pub(crate) db_pool: DbPool,
}

impl ServerConfig {
    /// Construct a server configuration.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, tokens: TokenConfig, db_pool: DbPool) -> Self {
        Self {
            bind_addr,
            tokens,
            db_pool,
        }
    }

    /// The socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
