//! OpenAPI documentation.
//!
//! [`ApiDoc`] gathers every `/api` handler and the health checks. The
//! document is served by Swagger UI in debug builds and printed by the
//! `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::validation::FieldError;
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::persons::{PersonRequest, PersonResponse};
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::users::{
    ChangePasswordRequest, CredentialsRequest, RenameUserRequest, UserResponse,
};

/// Registers both ways of authenticating: the session cookie and HTTP basic.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/user/login.",
            ))),
        );
        components.add_security_scheme(
            "BasicAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Basic)
                    .description(Some("Used when the server runs with ROSTER_AUTH_STRATEGY=basic."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Roster API",
        description = "Person and user records behind a credential login."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = []), ("BasicAuth" = [])),
    paths(
        crate::inbound::http::persons::list_persons,
        crate::inbound::http::persons::create_person,
        crate::inbound::http::persons::update_person,
        crate::inbound::http::persons::delete_person,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::initialize,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        FieldError,
        MessageResponse,
        PersonRequest,
        PersonResponse,
        CredentialsRequest,
        RenameUserRequest,
        ChangePasswordRequest,
        UserResponse
    )),
    tags(
        (name = "persons", description = "Person records"),
        (name = "users", description = "Accounts, login and first-run setup"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected object schema for {name}"),
        }
    }

    #[rstest]
    #[case("/api/person/list")]
    #[case("/api/person/update/{id}")]
    #[case("/api/user/login")]
    #[case("/api/user/changePassword/{id}")]
    #[case("/api/user/initialize")]
    #[case("/health/ready")]
    fn document_lists_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn user_schema_has_no_password_material() {
        let fields = object_fields("UserResponse");
        assert_eq!(fields, vec!["id".to_owned(), "username".to_owned()]);
    }

    #[rstest]
    fn person_schema_exposes_record_fields() {
        let fields = object_fields("PersonResponse");
        for field in ["id", "surname", "name", "birthdate"] {
            assert!(fields.iter().any(|f| f == field), "missing {field}");
        }
    }
}
