//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER, UserValidationError};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(detail = self.message(), trace_id = ?self.trace_id(), "internal error");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<UserValidationError> for Error {
    fn from(err: UserValidationError) -> Self {
        let details = match &err {
            UserValidationError::InvalidId => json!({"field": "id", "code": "invalid_object_id"}),
            UserValidationError::EmptyName => json!({"field": "name", "code": "empty"}),
            UserValidationError::EmptyEmail => json!({"field": "email", "code": "empty"}),
            UserValidationError::InvalidFieldType { field, .. } => {
                json!({"field": field, "code": "invalid_type"})
            }
            UserValidationError::ReservedField { field } => {
                json!({"field": field, "code": "reserved_field"})
            }
            UserValidationError::InvalidFieldName { field } => {
                json!({"field": field, "code": "invalid_field_name"})
            }
        };
        Error::invalid_request(err.to_string()).with_details(details)
    }
}

#[cfg(test)]
mod tests;
