//! Backend entry-point: loads settings, builds the pool, starts the server.

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::DbPool;
use backend::server::{ServerConfig, Settings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = Settings::from_env()?;
    let pool = DbPool::new(settings.pool_config())
        .await
        .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(settings.bind_addr, settings.token_config(), pool);
    info!(addr = %config.bind_addr(), "starting server");

    create_server(health_state, config)?.await
}
