//! Diagnostic endpoints.
//!
//! `TRACE /trace` echoes the request body back inside a JSON envelope. Bodies
//! that are not valid UTF-8 are decoded lossily rather than rejected.

use actix_web::web;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Message returned by the trace echo.
pub const TRACE_RECEIVED_MESSAGE: &str = "Trace received";

/// Body returned by `TRACE /trace`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TraceEcho {
    #[schema(example = "Trace received")]
    pub message: String,
    #[schema(example = "ping")]
    pub echo: String,
}

impl TraceEcho {
    fn from_body(body: &[u8]) -> Self {
        Self {
            message: TRACE_RECEIVED_MESSAGE.to_owned(),
            echo: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

/// Echo the request body.
#[utoipa::path(
    trace,
    path = "/trace",
    request_body(content = String, content_type = "text/plain"),
    responses((status = 200, description = "Echoed request body", body = TraceEcho)),
    tags = ["diagnostics"],
    operation_id = "traceEcho"
)]
#[actix_web::trace("/trace")]
pub async fn trace_echo(body: web::Bytes) -> web::Json<TraceEcho> {
    web::Json(TraceEcho::from_body(&body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{Method, StatusCode};
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    #[rstest]
    #[case(b"ping".as_slice(), "ping")]
    #[case(b"".as_slice(), "")]
    #[case(b"caf\xe9".as_slice(), "caf\u{fffd}")]
    #[actix_web::test]
    async fn echoes_body_lossily(#[case] body: &'static [u8], #[case] expected: &str) {
        let app = actix_test::init_service(App::new().service(trace_echo)).await;
        let request = actix_test::TestRequest::default()
            .method(Method::TRACE)
            .uri("/trace")
            .set_payload(body)
            .to_request();

        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let echo: TraceEcho = actix_test::read_body_json(response).await;
        assert_eq!(echo.message, TRACE_RECEIVED_MESSAGE);
        assert_eq!(echo.echo, expected);
    }
}
