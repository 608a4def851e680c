//! User API handlers.
//!
//! ```text
//! POST   /api/user/login               {"username":"admin","password":"secret"}
//! POST   /api/user/logout
//! GET    /api/user/list
//! GET    /api/user/initialize?username=admin&password=secret (POST too)
//! POST   /api/user/create              {"username":"bob","password":"pw"}
//! POST   /api/user/update/{id}         {"username":"robert"}
//! POST   /api/user/changePassword/{id} {"password":"new"}
//! DELETE /api/user/delete/{id}
//! ```

use actix_web::{delete, get, post, route, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::UserSummary;
use crate::domain::validation::{
    FieldError, FieldRequirement, FieldSource, is_missing, require_fields, validation_error,
};
use crate::domain::{AuthenticatedUser, Credentials, CredentialsValidationError, Error, Password};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::record_path::RecordPath;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const USERNAME: FieldRequirement = FieldRequirement::new("username", "Username is required");
const PASSWORD: FieldRequirement = FieldRequirement::new("password", "Password is required");

/// Body for login and account creation.
///
/// Example JSON: `{"username":"admin","password":"secret"}`
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CredentialsRequest {
    #[schema(example = "admin")]
    pub username: Option<String>,
    #[schema(example = "secret")]
    pub password: Option<String>,
}

impl FieldSource for CredentialsRequest {
    fn field_value(&self, field: &str) -> Option<&str> {
        match field {
            "username" => self.username.as_deref(),
            "password" => self.password.as_deref(),
            _ => None,
        }
    }
}

fn credentials_error(err: CredentialsValidationError) -> Error {
    validation_error(vec![FieldError::new(err.field(), err.to_string())])
}

impl TryFrom<CredentialsRequest> for Credentials {
    type Error = Error;

    fn try_from(value: CredentialsRequest) -> Result<Self, Self::Error> {
        require_fields(&value, &[USERNAME, PASSWORD]).map_err(validation_error)?;
        Credentials::try_from_parts(
            value.username.as_deref().unwrap_or_default(),
            value.password.as_deref().unwrap_or_default(),
        )
        .map_err(credentials_error)
    }
}

/// Body for renaming an account.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RenameUserRequest {
    #[schema(example = "robert")]
    pub username: Option<String>,
}

impl FieldSource for RenameUserRequest {
    fn field_value(&self, field: &str) -> Option<&str> {
        (field == "username").then_some(self.username.as_deref()).flatten()
    }
}

/// Body for changing an account's password.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ChangePasswordRequest {
    #[schema(example = "n3w-s3cret")]
    pub password: Option<String>,
}

impl FieldSource for ChangePasswordRequest {
    fn field_value(&self, field: &str) -> Option<&str> {
        (field == "password").then_some(self.password.as_deref()).flatten()
    }
}

/// Query parameters of the first-run initialisation endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InitializeQuery {
    /// Username of the first account.
    pub username: Option<String>,
    /// Password of the first account.
    pub password: Option<String>,
}

impl InitializeQuery {
    /// Credentials when both parameters are present and non-blank.
    fn credentials(&self) -> Option<Credentials> {
        let username = self.username.as_deref();
        let password = self.password.as_deref();
        if is_missing(username) || is_missing(password) {
            return None;
        }
        Credentials::try_from_parts(username.unwrap_or_default(), password.unwrap_or_default())
            .ok()
    }
}

/// Account as returned to clients; never carries password material.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "admin")]
    pub username: String,
}

impl From<UserSummary> for UserResponse {
    fn from(value: UserSummary) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username,
        }
    }
}

impl From<AuthenticatedUser> for UserResponse {
    fn from(value: AuthenticatedUser) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username,
        }
    }
}

/// Check credentials and start a session.
///
/// The session key is rotated on success and the response sets the
/// `session` cookie.
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Record store failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/user/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let credentials = Credentials::try_from(payload.into_inner())?;
    let user = state.login.authenticate(&credentials).await?;
    session.establish(&user)?;
    info!(user_id = %user.id, "user logged in");
    Ok(web::Json(UserResponse::from(user)))
}

/// End the current session. Succeeds without a session too.
#[utoipa::path(
    post,
    path = "/api/user/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    ),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/user/logout")]
pub async fn logout(session: SessionContext) -> web::Json<MessageResponse> {
    session.end();
    web::Json(MessageResponse::new("Logged out!"))
}

/// List accounts ordered by username.
#[utoipa::path(
    get,
    path = "/api/user/list",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Record store failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/user/list")]
pub async fn list_users(
    _caller: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.users.list_users().await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create the first account. Only allowed while no account exists.
///
/// Credentials travel as query parameters for both `GET` and `POST`.
#[utoipa::path(
    method(get, post),
    path = "/api/user/initialize",
    params(InitializeQuery),
    responses(
        (status = 200, description = "First user created", body = MessageResponse),
        (status = 400, description = "Already initialised or parameters missing", body = Error),
        (status = 500, description = "Record store failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "initialize",
    security([])
)]
#[route("/user/initialize", method = "GET", method = "POST")]
pub async fn initialize(
    state: web::Data<HttpState>,
    query: web::Query<InitializeQuery>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = state.users_command.initialize(query.credentials()).await?;
    info!(user_id = %id, "first user created");
    Ok(web::Json(MessageResponse::new("User created!")))
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/user/create",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "User created", body = MessageResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Record store failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/user/create")]
pub async fn create_user(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let credentials = Credentials::try_from(payload.into_inner())?;
    state.users_command.create_user(credentials).await?;
    Ok(web::Json(MessageResponse::new("User created!")))
}

/// Change an account's username.
#[utoipa::path(
    post,
    path = "/api/user/update/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body = RenameUserRequest,
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Unknown user or record store failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[post("/user/update/{id:.*}")]
pub async fn update_user(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    path: RecordPath,
    payload: web::Json<RenameUserRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let body = payload.into_inner();
    require_fields(&body, &[USERNAME]).map_err(validation_error)?;
    let id = path.into_inner();
    state
        .users_command
        .rename_user(&id, body.username.as_deref().unwrap_or_default())
        .await?;
    Ok(web::Json(MessageResponse::new("User updated!")))
}

/// Replace an account's password.
#[utoipa::path(
    post,
    path = "/api/user/changePassword/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Unknown user or record store failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[post("/user/changePassword/{id:.*}")]
pub async fn change_password(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    path: RecordPath,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let body = payload.into_inner();
    require_fields(&body, &[PASSWORD]).map_err(validation_error)?;
    let password =
        Password::try_new(body.password.as_deref().unwrap_or_default()).map_err(credentials_error)?;
    let id = path.into_inner();
    state.users_command.change_password(&id, password).await?;
    Ok(web::Json(MessageResponse::new("Password changed!")))
}

/// Delete an account.
#[utoipa::path(
    delete,
    path = "/api/user/delete/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Unknown user or record store failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/user/delete/{id:.*}")]
pub async fn delete_user(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    path: RecordPath,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = path.into_inner();
    state.users_command.delete_user(&id).await?;
    Ok(web::Json(MessageResponse::new("User deleted!")))
}

#[cfg(test)]
mod tests;
