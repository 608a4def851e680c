//! HTTP inbound adapter exposing the REST endpoints under `/api`.

pub mod auth;
pub mod error;
pub mod health;
pub mod persons;
pub mod record_path;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register the `/api` scope with its handlers and extractor error mapping.
///
/// The caller provides `web::Data<HttpState>` and the session middleware.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
            .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
            .service(persons::list_persons)
            .service(persons::create_person)
            .service(persons::update_person)
            .service(persons::delete_person)
            .service(users::login)
            .service(users::logout)
            .service(users::list_users)
            .service(users::initialize)
            .service(users::create_user)
            .service(users::update_user)
            .service(users::change_password)
            .service(users::delete_user),
    );
}
