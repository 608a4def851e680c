//! Roster server entry point.
//!
//! Loads settings, prepares the record store, and serves the REST API with
//! health checks and, in debug builds, Swagger UI.

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use roster::inbound::http::health::HealthState;
use roster::inbound::http::session_config::{BuildMode, session_settings_from_env};
use roster::outbound::persistence::{DbPool, PoolConfig, apply_migrations};
use roster::server::{ServerConfig, ServerSettings, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        ServerSettings::load().map_err(|e| eyre!("failed to load configuration: {e}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    session.log_summary();

    let mut config = ServerConfig::new(session, settings.bind_addr()?)
        .with_auth(settings.auth_strategy()?)
        .with_redis_url(settings.redis_url.clone())
        .with_cors_origins(settings.cors_origins())
        .with_unique_usernames(settings.enforce_unique_usernames)
        .with_bcrypt_cost(settings.bcrypt_cost()?)
        .with_force_https(settings.force_https)
        .with_request_timeout(settings.request_timeout());

    if let Some(url) = settings.database_url.as_deref() {
        let applied = apply_migrations(url)
            .await
            .wrap_err("failed to apply database migrations")?;
        info!(applied, "database migrations applied");
        let pool = DbPool::new(PoolConfig::new(url))
            .await
            .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(roster::server::prometheus_metrics()?));
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    server.await?;
    Ok(())
}
