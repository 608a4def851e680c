//! Cross-origin policy for browser clients.

use actix_cors::Cors;
use actix_web::http::{Method, header};

const PREFLIGHT_MAX_AGE_SECS: usize = 3600;

/// CORS middleware allowing credentialed calls from `origins`.
///
/// `*` admits any origin; the request origin is echoed back because
/// credentialed responses may not use the wildcard.
pub fn cors_policy(origins: &[String]) -> Cors {
    let base = if origins.iter().any(|origin| origin == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };
    base.allowed_methods([Method::GET, Method::POST, Method::DELETE])
        .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .supports_credentials()
        .max_age(PREFLIGHT_MAX_AGE_SECS)
}
