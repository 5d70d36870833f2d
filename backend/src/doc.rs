//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (users, trace,
//!   health)
//! - **Schemas**: the user resource, write payloads, and the error envelope
//!
//! The generated specification is served by Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, User};
use crate::inbound::http::diagnostics::TraceEcho;
use crate::inbound::http::users::{DeleteUserResponse, UserRequest};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users service API",
        description = "CRUD interface over user documents, plus diagnostics and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::users_options,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::replace_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::head_user,
        crate::inbound::http::users::user_options,
        crate::inbound::http::diagnostics::trace_echo,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(User, UserRequest, DeleteUserResponse, TraceEcho, Error, ErrorCode)),
    tags(
        (name = "users", description = "Operations on user documents"),
        (name = "diagnostics", description = "Request echo for debugging"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
