//! Redirect plain-HTTP requests to HTTPS.
//!
//! The scheme comes from [`actix_web::dev::ConnectionInfo`], which honours
//! `Forwarded` and `X-Forwarded-Proto`, so TLS terminated at a proxy still
//! counts as secure.

use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

/// Middleware answering `301 Moved Permanently` to non-HTTPS requests.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use roster::middleware::HttpsRedirect;
///
/// let app = App::new().wrap(HttpsRedirect::new(true));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpsRedirect {
    enabled: bool,
}

impl HttpsRedirect {
    /// Build the middleware; when `enabled` is false requests pass through.
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HttpsRedirect
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = HttpsRedirectMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HttpsRedirectMiddleware {
            service,
            enabled: self.enabled,
        }))
    }
}

/// Service wrapper produced by [`HttpsRedirect`].
pub struct HttpsRedirectMiddleware<S> {
    service: S,
    enabled: bool,
}

fn redirect_target(req: &ServiceRequest) -> Option<String> {
    let info = req.connection_info();
    if info.scheme().eq_ignore_ascii_case("https") {
        return None;
    }
    let path = req
        .uri()
        .path_and_query()
        .map_or("/", |pq| pq.as_str());
    Some(format!("https://{}{}", info.host(), path))
}

impl<S, B> Service<ServiceRequest> for HttpsRedirectMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let target = if self.enabled {
            redirect_target(&req)
        } else {
            None
        };
        if let Some(location) = target {
            debug!(%location, "redirecting plain HTTP request");
            let response = HttpResponse::MovedPermanently()
                .insert_header((header::LOCATION, location))
                .finish();
            return Box::pin(ready(Ok(req.into_response(response).map_into_right_body())));
        }
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
    }
}
