//! Request authentication for protected routes.
//!
//! The [`Authenticated`] extractor gates every protected handler. It follows
//! the strategy configured in [`HttpState`]: either the login stored in the
//! session, or HTTP basic credentials checked against the user store on
//! every request. Session logins are looked up again on each request so a
//! deleted account loses access at once.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use actix_web::error::InternalError;
use actix_web::http::header::{self, HeaderValue};
use actix_web::{FromRequest, HttpRequest, ResponseError, dev::Payload, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::ports::LoginService;
use crate::domain::{AuthenticatedUser, Credentials, Error, ErrorCode, UNAUTHORIZED_MESSAGE};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// How protected requests prove who they are.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStrategy {
    /// A prior login stored in the session cookie.
    #[default]
    Session,
    /// `Authorization: Basic` credentials on every request.
    Basic {
        /// Realm advertised in the `WWW-Authenticate` challenge.
        realm: String,
    },
}

/// Error raised when an auth strategy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown auth strategy `{0}` (expected `session` or `basic`)")]
pub struct UnknownAuthStrategy(pub String);

/// Strategy names accepted by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStrategyKind {
    /// Session cookie login.
    #[default]
    Session,
    /// HTTP basic credentials.
    Basic,
}

impl FromStr for AuthStrategyKind {
    type Err = UnknownAuthStrategy;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "session" => Ok(Self::Session),
            "basic" => Ok(Self::Basic),
            _ => Err(UnknownAuthStrategy(raw.to_owned())),
        }
    }
}

impl fmt::Display for AuthStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session => f.write_str("session"),
            Self::Basic => f.write_str("basic"),
        }
    }
}

impl AuthStrategyKind {
    /// Resolve into a strategy, using `realm` for basic challenges.
    pub fn with_realm(self, realm: impl Into<String>) -> AuthStrategy {
        match self {
            Self::Session => AuthStrategy::Session,
            Self::Basic => AuthStrategy::Basic {
                realm: realm.into(),
            },
        }
    }
}

/// Identity of the caller of a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(pub AuthenticatedUser);

impl Authenticated {
    /// The authenticated account.
    pub fn user(&self) -> &AuthenticatedUser {
        &self.0
    }
}

/// Decode `Authorization: Basic` into username and password.
///
/// Returns `None` when the header is absent, uses another scheme, or does
/// not decode to `user:password` text.
pub fn decode_basic_credentials(req: &HttpRequest) -> Option<(String, String)> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some((username.to_owned(), password.to_owned()))
}

fn unauthorized() -> Error {
    Error::unauthorized(UNAUTHORIZED_MESSAGE)
}

/// Attach the basic challenge to authentication failures.
fn challenge(error: Error, realm: &str) -> actix_web::Error {
    if error.code() != ErrorCode::Unauthorized {
        return error.into();
    }
    let mut response = error.error_response();
    if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{realm}\"")) {
        response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
    }
    InternalError::from_response(error, response).into()
}

async fn authenticate_basic(
    login: Arc<dyn LoginService>,
    credentials: Option<(String, String)>,
) -> Result<AuthenticatedUser, Error> {
    let Some((username, password)) = credentials else {
        debug!("basic credentials missing or malformed");
        return Err(unauthorized());
    };
    let credentials = Credentials::try_from_parts(&username, &password).map_err(|err| {
        debug!(error = %err, "basic credentials incomplete");
        unauthorized()
    })?;
    login.authenticate(&credentials).await
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<HttpState>>().cloned() else {
            return Box::pin(async {
                Err::<Self, actix_web::Error>(Error::internal("HTTP state is not configured").into())
            });
        };

        match state.auth.clone() {
            AuthStrategy::Session => {
                let session = SessionContext::from_http_request(req);
                let login = Arc::clone(&state.login);
                Box::pin(async move {
                    let user = session.user()?.ok_or_else(unauthorized)?;
                    let Some(current) = login.resolve(&user.id).await? else {
                        debug!(user_id = %user.id, "session names a deleted account");
                        session.end();
                        return Err(actix_web::Error::from(unauthorized()));
                    };
                    Ok::<_, actix_web::Error>(Authenticated(current))
                })
            }
            AuthStrategy::Basic { realm } => {
                let credentials = decode_basic_credentials(req);
                let login = Arc::clone(&state.login);
                Box::pin(async move {
                    authenticate_basic(login, credentials)
                        .await
                        .map(Authenticated)
                        .map_err(|err| challenge(err, &realm))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[rstest]
    #[case("session", AuthStrategyKind::Session)]
    #[case(" Basic ", AuthStrategyKind::Basic)]
    fn strategy_names_parse(#[case] raw: &str, #[case] expected: AuthStrategyKind) {
        assert_eq!(raw.parse::<AuthStrategyKind>(), Ok(expected));
    }

    #[rstest]
    fn unknown_strategy_names_fail() {
        let err = "oauth".parse::<AuthStrategyKind>().expect_err("unknown");
        assert!(err.to_string().contains("oauth"));
    }

    #[rstest]
    fn basic_kind_carries_the_realm() {
        assert_eq!(
            AuthStrategyKind::Basic.with_realm("roster"),
            AuthStrategy::Basic {
                realm: "roster".into()
            }
        );
    }

    #[rstest]
    #[case(basic("admin:secret"), Some(("admin", "secret")))]
    #[case(basic("admin:se:cret"), Some(("admin", "se:cret")))]
    #[case(basic("admin:"), Some(("admin", "")))]
    #[case(basic("no-colon"), None)]
    #[case("Bearer abc".to_owned(), None)]
    #[case("Basic !!!not-base64".to_owned(), None)]
    fn basic_headers_decode(#[case] header_value: String, #[case] expected: Option<(&str, &str)>) {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, header_value))
            .to_http_request();
        let decoded = decode_basic_credentials(&req);
        assert_eq!(
            decoded,
            expected.map(|(u, p)| (u.to_owned(), p.to_owned()))
        );
    }

    #[rstest]
    fn missing_header_decodes_to_none() {
        let req = TestRequest::default().to_http_request();
        assert!(decode_basic_credentials(&req).is_none());
    }

    #[rstest]
    fn challenges_only_decorate_unauthorized_errors() {
        let err = challenge(unauthorized(), "roster");
        let response = err.error_response();
        assert_eq!(
            response
                .headers()
                .get(header::WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok()),
            Some("Basic realm=\"roster\"")
        );

        let err = challenge(Error::internal("boom"), "roster");
        assert!(
            err.error_response()
                .headers()
                .get(header::WWW_AUTHENTICATE)
                .is_none()
        );
    }
}
