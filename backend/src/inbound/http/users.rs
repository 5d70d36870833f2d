//! Users API handlers.
//!
//! ```text
//! GET    /users
//! POST   /users        {"name":"Ada","email":"ada@x.com","age":36}
//! GET    /users/{id}
//! PUT    /users/{id}   {"name":"Ada","email":"ada@x.com"}
//! PATCH  /users/{id}   {"age":30}
//! DELETE /users/{id}
//! HEAD   /users/{id}
//! ```
//!
//! Identifiers are validated before any port is called, so a malformed id
//! always yields `400` and never reaches the store.

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, head, options, patch, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::{Error, User, UserDraft, UserId, UserPatch, UserValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Methods advertised by `OPTIONS` on the users collection and items.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS, HEAD";

/// Response header set by `HEAD /users/{id}` when the user exists.
pub const USER_EXISTS_HEADER: &str = "User-Exists";

/// Confirmation message returned after a successful delete.
pub const USER_DELETED_MESSAGE: &str = "User deleted successfully";

/// Full user payload for `POST /users` and `PUT /users/{id}`.
///
/// Example JSON:
/// `{"name":"Ada","email":"ada@x.com","age":36}`
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UserRequest {
    #[serde(default)]
    #[schema(example = "Ada")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "ada@x.com")]
    pub email: String,
    #[serde(default)]
    #[schema(example = 36)]
    pub age: Option<i64>,
}

impl TryFrom<UserRequest> for UserDraft {
    type Error = UserValidationError;

    fn try_from(value: UserRequest) -> Result<Self, Self::Error> {
        Self::try_new(value.name, value.email, value.age)
    }
}

/// Body returned by `DELETE /users/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DeleteUserResponse {
    #[schema(example = "User deleted successfully")]
    pub message: String,
}

fn parse_user_id(raw: &str) -> ApiResult<UserId> {
    Ok(UserId::new(raw)?)
}

/// List all stored users.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use users_service::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users.list_users().await?;
    Ok(web::Json(users))
}

/// Create a user; the store assigns its identifier.
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Created user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserRequest>,
) -> ApiResult<web::Json<User>> {
    let draft = UserDraft::try_from(payload.into_inner())?;
    let user = state.users_command.create_user(draft).await?;
    Ok(web::Json(user))
}

/// Fetch a single user.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "24-hex-character user identifier")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Invalid user ID", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let user = state.users.fetch_user(&id).await?;
    Ok(web::Json(user))
}

/// Replace every writable field of a user. Omitted optional fields are cleared.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = String, Path, description = "24-hex-character user identifier")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "Replaced user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "replaceUser"
)]
#[put("/users/{id}")]
pub async fn replace_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UserRequest>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let draft = UserDraft::try_from(payload.into_inner())?;
    let user = state.users_command.replace_user(&id, draft).await?;
    Ok(web::Json(user))
}

/// Merge the supplied fields into a user, leaving the rest untouched.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = String, Path, description = "24-hex-character user identifier")),
    request_body(content = Object, description = "Subset of user fields to merge"),
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let patch = UserPatch::try_from_fields(payload.into_inner())?;
    let user = state.users_command.update_user(&id, patch).await?;
    Ok(web::Json(user))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "24-hex-character user identifier")),
    responses(
        (status = 200, description = "User deleted", body = DeleteUserResponse),
        (status = 400, description = "Invalid user ID", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeleteUserResponse>> {
    let id = parse_user_id(&path)?;
    state.users_command.delete_user(&id).await?;
    Ok(web::Json(DeleteUserResponse {
        message: USER_DELETED_MESSAGE.to_owned(),
    }))
}

/// Report whether a user exists without returning a body.
#[utoipa::path(
    head,
    path = "/users/{id}",
    params(("id" = String, Path, description = "24-hex-character user identifier")),
    responses(
        (
            status = 200,
            description = "User exists",
            headers(("User-Exists" = String, description = "Always `true`"))
        ),
        (status = 400, description = "Invalid user ID"),
        (status = 404, description = "User not found")
    ),
    tags = ["users"],
    operation_id = "headUser"
)]
#[head("/users/{id}")]
pub async fn head_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state.users.ensure_user_exists(&id).await?;
    Ok(HttpResponse::Ok()
        .insert_header((USER_EXISTS_HEADER, "true"))
        .finish())
}

fn allow_response() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::ALLOW, ALLOWED_METHODS))
        .finish()
}

/// Advertise the methods supported on the users collection.
#[utoipa::path(
    options,
    path = "/users",
    responses((
        status = 200,
        description = "Supported methods",
        headers(("Allow" = String, description = "Comma-separated method list"))
    )),
    tags = ["users"],
    operation_id = "usersOptions"
)]
#[options("/users")]
pub async fn users_options() -> HttpResponse {
    allow_response()
}

/// Advertise the methods supported on a single user. The id is not checked.
#[utoipa::path(
    options,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses((
        status = 200,
        description = "Supported methods",
        headers(("Allow" = String, description = "Comma-separated method list"))
    )),
    tags = ["users"],
    operation_id = "userOptions"
)]
#[options("/users/{id}")]
pub async fn user_options() -> HttpResponse {
    allow_response()
}

/// Register every users handler on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(create_user)
        .service(users_options)
        .service(get_user)
        .service(replace_user)
        .service(update_user)
        .service(delete_user)
        .service(head_user)
        .service(user_options);
}
