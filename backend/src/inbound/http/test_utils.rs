//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use crate::domain::{Credentials, PersonDirectory, UserAccounts};
use crate::inbound::http::configure_api;
use crate::inbound::http::auth::AuthStrategy;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::crypto::BcryptPasswordHasher;
use crate::outbound::memory::{
    InMemoryPersonRepository, InMemoryUserRepository, MemorySessionStore,
};

/// Cheapest bcrypt cost, so tests do not spend time hashing.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Session middleware for tests: fresh store and key per call, cookie
/// `session`, `Secure` disabled for plain-HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<MemorySessionStore> {
    SessionMiddleware::builder(MemorySessionStore::new(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state over empty in-memory repositories.
pub fn memory_state(auth: AuthStrategy) -> HttpState {
    let persons = Arc::new(PersonDirectory::new(Arc::new(InMemoryPersonRepository::new())));
    let accounts = Arc::new(UserAccounts::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(BcryptPasswordHasher::new(TEST_BCRYPT_COST)),
    ));
    HttpState::new(
        HttpStatePorts {
            login: accounts.clone(),
            persons: persons.clone(),
            persons_command: persons,
            users: accounts.clone(),
            users_command: accounts,
        },
        auth,
    )
}

/// App serving the `/api` scope over `state` with in-memory sessions.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .configure(configure_api)
}

/// Session state whose store already holds `admin` / `secret`.
pub async fn seeded_state() -> HttpState {
    let state = memory_state(AuthStrategy::Session);
    let admin = Credentials::try_from_parts("admin", "secret").expect("valid credentials");
    state
        .users_command
        .initialize(Some(admin))
        .await
        .expect("seed admin");
    state
}

/// Log in through the API and return the session cookie.
pub async fn login_cookie(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    username: &str,
    password: &str,
) -> Cookie<'static> {
    let request = test::TestRequest::post()
        .uri("/api/user/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let response = test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    response
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Read a JSON response body.
pub async fn json_body(response: ServiceResponse) -> Value {
    let body = test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}
