//! Tests for user API handlers.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{
    ALREADY_INITIALIZED_MESSAGE, INITIALIZE_MANDATORY_MESSAGE, PersonDirectory,
    UNAUTHORIZED_MESSAGE, USERNAME_TAKEN_MESSAGE, UserAccounts,
};
use crate::inbound::http::auth::AuthStrategy;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::test_utils::{
    TEST_BCRYPT_COST, api_app, json_body, login_cookie, memory_state, seeded_state,
};
use crate::outbound::crypto::BcryptPasswordHasher;
use crate::outbound::memory::{InMemoryPersonRepository, InMemoryUserRepository};

fn unique_username_state() -> HttpState {
    let persons = Arc::new(PersonDirectory::new(Arc::new(InMemoryPersonRepository::new())));
    let accounts = Arc::new(
        UserAccounts::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(BcryptPasswordHasher::new(TEST_BCRYPT_COST)),
        )
        .with_unique_usernames(true),
    );
    HttpState::new(
        HttpStatePorts {
            login: accounts.clone(),
            persons: persons.clone(),
            persons_command: persons,
            users: accounts.clone(),
            users_command: accounts,
        },
        AuthStrategy::Session,
    )
}

async fn user_id(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &actix_web::cookie::Cookie<'static>,
    username: &str,
) -> String {
    let req = test::TestRequest::get()
        .uri("/api/user/list")
        .cookie(cookie.clone())
        .to_request();
    let users = json_body(test::call_service(app, req).await).await;
    users
        .as_array()
        .expect("user array")
        .iter()
        .find(|u| u["username"] == username)
        .and_then(|u| u["id"].as_str())
        .expect("user listed")
        .to_owned()
}

#[rstest]
#[case(json!({ "password": "secret" }), vec!["username"])]
#[case(json!({ "username": "admin", "password": "  " }), vec!["password"])]
#[case(json!({ "username": null, "password": "" }), vec!["username", "password"])]
#[actix_web::test]
async fn login_validates_before_lookup(#[case] body: Value, #[case] fields: Vec<&str>) {
    let app = test::init_service(api_app(seeded_state().await)).await;

    let req = test::TestRequest::post()
        .uri("/api/user/login")
        .set_json(body)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error = json_body(res).await;
    let reported: Vec<&str> = error["details"]
        .as_array()
        .expect("details")
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert_eq!(reported, fields);
}

#[rstest]
#[case("admin", "wrong")]
#[case("nobody", "secret")]
#[actix_web::test]
async fn login_failures_look_the_same(#[case] username: &str, #[case] password: &str) {
    let app = test::init_service(api_app(seeded_state().await)).await;

    let req = test::TestRequest::post()
        .uri("/api/user/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.response().cookies().next().is_none());
    assert_eq!(
        json_body(res).await,
        json!({ "code": "unauthorized", "message": UNAUTHORIZED_MESSAGE })
    );
}

#[actix_web::test]
async fn login_returns_identity_and_sets_cookie() {
    let app = test::init_service(api_app(seeded_state().await)).await;

    let req = test::TestRequest::post()
        .uri("/api/user/login")
        .set_json(json!({ "username": "admin", "password": "secret" }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie");
    assert_eq!(cookie.http_only(), Some(true));
    let body = json_body(res).await;
    assert_eq!(body["username"], "admin");
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body.get("password").is_none());
}

#[actix_web::test]
async fn logout_ends_the_session() {
    let app = test::init_service(api_app(seeded_state().await)).await;
    let cookie = login_cookie(&app, "admin", "secret").await;

    let req = test::TestRequest::post()
        .uri("/api/user/logout")
        .cookie(cookie.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cleared = res
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("removal cookie")
        .into_owned();
    assert_eq!(json_body(res).await, json!({ "message": "Logged out!" }));

    for replayed in [cleared, cookie] {
        let req = test::TestRequest::get()
            .uri("/api/user/list")
            .cookie(replayed)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}

#[actix_web::test]
async fn deleted_accounts_lose_their_session() {
    let app = test::init_service(api_app(seeded_state().await)).await;
    let admin = login_cookie(&app, "admin", "secret").await;
    let create = test::TestRequest::post()
        .uri("/api/user/create")
        .cookie(admin.clone())
        .set_json(json!({ "username": "bob", "password": "builder" }))
        .to_request();
    test::call_service(&app, create).await;
    let bob = user_id(&app, &admin, "bob").await;
    let bob_cookie = login_cookie(&app, "bob", "builder").await;

    let delete = test::TestRequest::delete()
        .uri(&format!("/api/user/delete/{bob}"))
        .cookie(admin.clone())
        .to_request();
    assert_eq!(test::call_service(&app, delete).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/person/list")
        .cookie(bob_cookie)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(res).await["message"], UNAUTHORIZED_MESSAGE);

    let req = test::TestRequest::get()
        .uri("/api/person/list")
        .cookie(admin)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn logout_without_session_succeeds() {
    let app = test::init_service(api_app(seeded_state().await)).await;

    let req = test::TestRequest::post().uri("/api/user/logout").to_request();

    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[rstest]
#[case("/api/user/initialize", INITIALIZE_MANDATORY_MESSAGE)]
#[case("/api/user/initialize?username=admin", INITIALIZE_MANDATORY_MESSAGE)]
#[case("/api/user/initialize?username=admin&password=%20", INITIALIZE_MANDATORY_MESSAGE)]
#[actix_web::test]
async fn initialize_requires_both_parameters(#[case] uri: &str, #[case] message: &str) {
    let app = test::init_service(api_app(memory_state(AuthStrategy::Session))).await;

    let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["message"], message);
}

#[actix_web::test]
async fn initialize_runs_only_once() {
    let app = test::init_service(api_app(memory_state(AuthStrategy::Session))).await;

    let first = test::TestRequest::get()
        .uri("/api/user/initialize?username=admin&password=secret")
        .to_request();
    let res = test::call_service(&app, first).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!({ "message": "User created!" }));

    // Missing parameters no longer matter once an account exists.
    let again = test::TestRequest::get().uri("/api/user/initialize").to_request();
    let res = test::call_service(&app, again).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["message"], ALREADY_INITIALIZED_MESSAGE);

    login_cookie(&app, "admin", "secret").await;
}

#[actix_web::test]
async fn account_management_round_trip() {
    let app = test::init_service(api_app(seeded_state().await)).await;
    let cookie = login_cookie(&app, "admin", "secret").await;

    let create = test::TestRequest::post()
        .uri("/api/user/create")
        .cookie(cookie.clone())
        .set_json(json!({ "username": "bob", "password": "builder" }))
        .to_request();
    let res = test::call_service(&app, create).await;
    assert_eq!(json_body(res).await, json!({ "message": "User created!" }));
    let bob = user_id(&app, &cookie, "bob").await;

    let rename = test::TestRequest::post()
        .uri(&format!("/api/user/update/{bob}"))
        .cookie(cookie.clone())
        .set_json(json!({ "username": "robert" }))
        .to_request();
    let res = test::call_service(&app, rename).await;
    assert_eq!(json_body(res).await, json!({ "message": "User updated!" }));

    let change = test::TestRequest::post()
        .uri(&format!("/api/user/changePassword/{bob}"))
        .cookie(cookie.clone())
        .set_json(json!({ "password": "fixer" }))
        .to_request();
    let res = test::call_service(&app, change).await;
    assert_eq!(json_body(res).await, json!({ "message": "Password changed!" }));
    login_cookie(&app, "robert", "fixer").await;

    let delete = test::TestRequest::delete()
        .uri(&format!("/api/user/delete/{bob}"))
        .cookie(cookie.clone())
        .to_request();
    let res = test::call_service(&app, delete).await;
    assert_eq!(json_body(res).await, json!({ "message": "User deleted!" }));

    let list = test::TestRequest::get()
        .uri("/api/user/list")
        .cookie(cookie)
        .to_request();
    let users = json_body(test::call_service(&app, list).await).await;
    assert_eq!(users.as_array().map(Vec::len), Some(1));
    assert_eq!(users[0]["username"], "admin");
    assert!(users[0].get("password").is_none());
    assert!(users[0].get("password_hash").is_none());
}

#[rstest]
#[case("update", json!({ "username": "" }), "username")]
#[case("changePassword", json!({}), "password")]
#[actix_web::test]
async fn account_changes_validate_their_field(
    #[case] action: &str,
    #[case] body: Value,
    #[case] field: &str,
) {
    let app = test::init_service(api_app(seeded_state().await)).await;
    let cookie = login_cookie(&app, "admin", "secret").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/user/{action}/whatever"))
        .cookie(cookie)
        .set_json(body)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["details"][0]["field"], field);
}

#[rstest]
#[case(test::TestRequest::post().uri("/api/user/update/missing").set_json(json!({ "username": "x" })))]
#[case(test::TestRequest::post().uri("/api/user/changePassword/missing").set_json(json!({ "password": "x" })))]
#[case(test::TestRequest::delete().uri("/api/user/delete/missing"))]
#[case(test::TestRequest::post().uri("/api/user/update/a/b").set_json(json!({ "username": "x" })))]
#[case(test::TestRequest::post().uri("/api/user/changePassword/").set_json(json!({ "password": "x" })))]
#[case(test::TestRequest::delete().uri("/api/user/delete/"))]
#[actix_web::test]
async fn unknown_user_is_a_store_error(#[case] request: test::TestRequest) {
    let app = test::init_service(api_app(seeded_state().await)).await;
    let cookie = login_cookie(&app, "admin", "secret").await;

    let res = test::call_service(&app, request.cookie(cookie).to_request()).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(res).await["message"],
        "Error finding existing user (database error). Please try again."
    );
}

#[rstest]
#[case(test::TestRequest::get().uri("/api/user/list"))]
#[case(test::TestRequest::post().uri("/api/user/create").set_json(json!({})))]
#[case(test::TestRequest::delete().uri("/api/user/delete/1"))]
#[actix_web::test]
async fn user_routes_require_a_login(#[case] request: test::TestRequest) {
    let app = test::init_service(api_app(seeded_state().await)).await;

    let res = test::call_service(&app, request.to_request()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn duplicate_usernames_rejected_when_enforced() {
    let state = unique_username_state();
    let app = test::init_service(api_app(state)).await;
    let init = test::TestRequest::get()
        .uri("/api/user/initialize?username=admin&password=secret")
        .to_request();
    assert_eq!(test::call_service(&app, init).await.status(), StatusCode::OK);
    let cookie = login_cookie(&app, "admin", "secret").await;

    let req = test::TestRequest::post()
        .uri("/api/user/create")
        .cookie(cookie)
        .set_json(json!({ "username": "admin", "password": "other" }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(res).await["details"],
        json!([{ "field": "username", "message": USERNAME_TAKEN_MESSAGE }])
    );
}

fn basic(username: &str, password: &str) -> (header::HeaderName, String) {
    (
        header::AUTHORIZATION,
        format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))),
    )
}

#[actix_web::test]
async fn basic_strategy_checks_every_request() {
    let state = memory_state(AuthStrategy::Basic {
        realm: "roster".into(),
    });
    let app = test::init_service(api_app(state)).await;
    let init = test::TestRequest::get()
        .uri("/api/user/initialize?username=admin&password=secret")
        .to_request();
    assert_eq!(test::call_service(&app, init).await.status(), StatusCode::OK);

    let ok = test::TestRequest::get()
        .uri("/api/user/list")
        .insert_header(basic("admin", "secret"))
        .to_request();
    assert_eq!(test::call_service(&app, ok).await.status(), StatusCode::OK);

    let denied = test::TestRequest::get()
        .uri("/api/user/list")
        .insert_header(basic("admin", "nope"))
        .to_request();
    let res = test::call_service(&app, denied).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok()),
        Some("Basic realm=\"roster\"")
    );
}
