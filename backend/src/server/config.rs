//! Resolved server configuration handed to [`super::create_server`].

use std::net::SocketAddr;
use std::time::Duration;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use crate::inbound::http::auth::AuthStrategy;
use crate::inbound::http::session_config::SessionSettings;
use crate::outbound::crypto::DEFAULT_BCRYPT_COST;
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) auth: AuthStrategy,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) redis_url: Option<String>,
    pub(crate) cors_origins: Vec<String>,
    pub(crate) unique_usernames: bool,
    pub(crate) bcrypt_cost: u32,
    pub(crate) force_https: bool,
    pub(crate) request_timeout: Duration,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Configuration with cookie sessions, the in-memory store and defaults
    /// for everything else.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            auth: AuthStrategy::Session,
            db_pool: None,
            redis_url: None,
            cors_origins: Vec::new(),
            unique_usernames: false,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            force_https: false,
            request_timeout: Duration::from_secs(30),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Select how protected routes authenticate callers.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthStrategy) -> Self {
        self.auth = auth;
        self
    }

    /// Persist records in PostgreSQL through `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Keep sessions in Redis at `url`.
    #[must_use]
    pub fn with_redis_url(mut self, url: Option<String>) -> Self {
        self.redis_url = url;
        self
    }

    /// Browser origins allowed to call the API with credentials.
    #[must_use]
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Reject usernames already held by another account.
    #[must_use]
    pub fn with_unique_usernames(mut self, enabled: bool) -> Self {
        self.unique_usernames = enabled;
        self
    }

    /// bcrypt work factor for new hashes.
    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Redirect plain-HTTP requests to HTTPS.
    #[must_use]
    pub fn with_force_https(mut self, enabled: bool) -> Self {
        self.force_https = enabled;
        self
    }

    /// Client request and keep-alive timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
