//! Shared helpers for the roster integration tests.
//!
//! Each suite under `backend/tests/` compiles as its own crate; these helpers
//! assemble the real application over in-memory repositories so suites only
//! describe requests and expectations.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web};
use serde_json::Value;

use roster::inbound::http::auth::AuthStrategy;
use roster::inbound::http::health::HealthState;
use roster::inbound::http::session_config::SessionSettings;
use roster::outbound::memory::{
    InMemoryPersonRepository, InMemoryUserRepository, MemorySessionStore,
};
use roster::server::{
    AppDependencies, ServerConfig, SessionCookie, build_app, http_state_over, session_middleware,
};

/// Cheapest bcrypt cost accepted by the hasher.
pub const TEST_BCRYPT_COST: u32 = 4;

fn test_session() -> SessionSettings {
    SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
        ttl: Duration::from_secs(2 * 60 * 60),
    }
}

/// Server configuration for tests; never bound to a socket.
pub fn test_config(auth: AuthStrategy) -> ServerConfig {
    ServerConfig::new(test_session(), SocketAddr::from(([127, 0, 0, 1], 0)))
        .with_auth(auth)
        .with_bcrypt_cost(TEST_BCRYPT_COST)
        .with_cors_origins(vec!["http://localhost:4200".to_owned()])
}

/// Initialise the full application over empty in-memory repositories.
pub async fn init_app(
    config: &ServerConfig,
) -> impl Service<Request, Response = ServiceResponse<impl actix_web::body::MessageBody>, Error = actix_web::Error>
{
    let state = http_state_over(
        Arc::new(InMemoryPersonRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
        config,
    );
    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    let deps = AppDependencies {
        health_state: health,
        http_state: web::Data::new(state),
        cors_origins: vec!["http://localhost:4200".to_owned()],
        force_https: false,
    };
    let cookie = SessionCookie {
        key: Key::generate(),
        secure: false,
        same_site: SameSite::Lax,
        ttl: Duration::from_secs(2 * 60 * 60),
    };
    test::init_service(build_app(
        deps,
        session_middleware(MemorySessionStore::new(), &cookie),
    ))
    .await
}

/// Status and parsed JSON body of a response.
pub async fn status_and_json<B>(response: ServiceResponse<B>) -> (u16, Value)
where
    B: actix_web::body::MessageBody,
{
    let status = response.status().as_u16();
    let body = test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

/// The `session` cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .map(Cookie::into_owned)
}
