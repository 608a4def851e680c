//! Server construction and middleware wiring.

mod config;
mod cors;
#[cfg(feature = "metrics")]
mod metrics;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use cors::cors_policy;
pub use settings::{ServerSettings, SettingsError};
pub use state_builders::{build_http_state, http_state_over};

#[cfg(feature = "metrics")]
pub use metrics::prometheus_metrics;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;

use actix_session::storage::{RedisSessionStore, SessionStore};
use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
};
use actix_web::body::MessageBody;
use actix_web::cookie::{Key, SameSite, time};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::configure_api;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::state::HttpState;
use crate::middleware::{HttpsRedirect, Trace};
use crate::outbound::memory::MemorySessionStore;

/// Cookie parameters shared by every worker's session middleware.
#[derive(Clone)]
pub struct SessionCookie {
    pub key: Key,
    pub secure: bool,
    pub same_site: SameSite,
    pub ttl: std::time::Duration,
}

/// Session middleware over `store` with the `session` cookie.
pub fn session_middleware<Store>(store: Store, cookie: &SessionCookie) -> SessionMiddleware<Store>
where
    Store: SessionStore,
{
    let ttl = time::Duration::seconds(i64::try_from(cookie.ttl.as_secs()).unwrap_or(i64::MAX));
    SessionMiddleware::builder(store, cookie.key.clone())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie.secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(cookie.same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(ttl))
        .build()
}

/// Everything a worker needs to build the application.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub cors_origins: Vec<String>,
    pub force_https: bool,
}

/// Assemble the application: `/api`, health checks and, in debug builds,
/// Swagger UI at `/docs`.
pub fn build_app<Store>(
    deps: AppDependencies,
    session: SessionMiddleware<Store>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    Store: SessionStore + 'static,
{
    let AppDependencies {
        health_state,
        http_state,
        cors_origins,
        force_https,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .configure(configure_api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.wrap(session)
        .wrap(Trace)
        .wrap(cors_policy(&cors_origins))
        .wrap(HttpsRedirect::new(force_https))
}

/// Construct the Actix HTTP server.
///
/// Sessions live in Redis when a URL is configured, otherwise in process
/// memory. Either way the cookie only carries the session key.
///
/// # Errors
/// Propagates [`std::io::Error`] when Redis is unreachable or binding the
/// socket fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config));
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        cors_origins: config.cors_origins.clone(),
        force_https: config.force_https,
    };
    let cookie = SessionCookie {
        key: config.session.key.clone(),
        secure: config.session.cookie_secure,
        same_site: config.session.same_site,
        ttl: config.session.ttl,
    };

    let server = match config.redis_url.as_deref() {
        Some(url) => {
            let store = RedisSessionStore::new(url).await.map_err(|error| {
                std::io::Error::other(format!("failed to connect session store: {error}"))
            })?;
            info!("sessions stored in redis");
            serve(&config, deps, move || {
                session_middleware(store.clone(), &cookie)
            })?
        }
        None => {
            let store = MemorySessionStore::new();
            warn!("no redis url configured; sessions kept in process memory");
            serve(&config, deps, move || {
                session_middleware(store.clone(), &cookie)
            })?
        }
    };

    health_state.mark_ready();
    Ok(server)
}

fn serve<Store, F>(config: &ServerConfig, deps: AppDependencies, make_session: F) -> std::io::Result<Server>
where
    Store: SessionStore + 'static,
    F: Fn() -> SessionMiddleware<Store> + Clone + Send + 'static,
{
    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(config.prometheus.clone());

    let server = HttpServer::new(move || {
        let app = build_app(deps.clone(), make_session());

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .client_request_timeout(config.request_timeout)
    .keep_alive(config.request_timeout)
    .bind(config.bind_addr)?
    .run();

    info!(bind_addr = %config.bind_addr, "listening");
    Ok(server)
}
