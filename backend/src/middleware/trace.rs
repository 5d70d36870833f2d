//! Request correlation: the [`TraceId`] type and the [`Trace`] middleware.
//!
//! A caller may supply its own UUID in the `trace-id` request header; it is
//! kept when it parses, otherwise a fresh one is minted. The id lives in a
//! Tokio task-local for the duration of the handler, so `Error` values built
//! anywhere below it pick the id up without threading it through calls. Work
//! moved onto another task must be wrapped in [`TraceId::scope`] to keep it.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tokio::task_local;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::TRACE_ID_HEADER;

task_local! {
    static CURRENT: TraceId;
}

/// Correlation id shared by a request's logs, error body, and response header.
///
/// # Examples
/// ```
/// use users_service::TraceId;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let id: TraceId = "6f1c1b9e-3f7a-4c55-9d0e-2a8b1c4d5e6f".parse().expect("uuid");
/// let seen = TraceId::scope(id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(id));
/// assert_eq!(TraceId::current(), None);
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse the caller's id from `trace-id` when it is a UUID.
    fn from_request(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(TRACE_ID_HEADER)?
            .to_str()
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    /// The id of the request being served on this task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current id.
    pub async fn scope<Fut: Future>(trace_id: Self, fut: Fut) -> Fut::Output {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Middleware scoping each request under a [`TraceId`], echoing it in the
/// `trace-id` response header and logging one line per completed request.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use users_service::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = TraceId::from_request(req.headers()).unwrap_or_else(TraceId::generate);
        let method = req.method().clone();
        let path = req.path().to_owned();
        let started = Instant::now();
        // Handler futures are lazy, so polling inside the scope covers the
        // whole handler body.
        let handled = self.service.call(req);

        Box::pin(TraceId::scope(trace_id, async move {
            let mut res = handled.await?;
            let status = res.status().as_u16();
            info!(
                %method,
                %path,
                status,
                elapsed = ?started.elapsed(),
                %trace_id,
                "request completed"
            );
            match HeaderValue::from_str(&trace_id.to_string()) {
                Ok(value) => {
                    res.headers_mut()
                        .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                }
                Err(error) => warn!(%error, %trace_id, "trace id is not a valid header value"),
            }
            Ok(res)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;

    use crate::domain::Error as DomainError;
    use crate::inbound::http::ApiResult;

    async fn handler_trace_id() -> HttpResponse {
        match TraceId::current() {
            Some(id) => HttpResponse::Ok().body(id.to_string()),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    async fn failing_handler() -> ApiResult<HttpResponse> {
        Err(DomainError::not_found("User not found"))
    }

    async fn call(request: actix_test::TestRequest) -> actix_web::dev::ServiceResponse {
        let app = actix_test::init_service(
            App::new()
                .wrap(Trace)
                .route("/", web::get().to(handler_trace_id))
                .route("/fail", web::get().to(failing_handler)),
        )
        .await;
        actix_test::call_service(&app, request.to_request()).await
    }

    fn header_trace_id(res: &actix_web::dev::ServiceResponse) -> String {
        res.headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("trace-id header present")
            .to_owned()
    }

    #[actix_web::test]
    async fn handler_sees_the_id_sent_back_in_the_header() {
        let res = call(actix_test::TestRequest::get().uri("/")).await;
        let sent = header_trace_id(&res);
        assert!(sent.parse::<TraceId>().is_ok());

        let body = actix_test::read_body(res).await;
        assert_eq!(std::str::from_utf8(&body).expect("utf8"), sent);
    }

    #[actix_web::test]
    async fn error_body_carries_the_header_id() {
        let res = call(actix_test::TestRequest::get().uri("/fail")).await;
        let sent = header_trace_id(&res);

        let body: DomainError = actix_test::read_body_json(res).await;
        assert_eq!(body.trace_id(), Some(sent.as_str()));
    }

    #[actix_web::test]
    async fn caller_supplied_uuid_is_propagated() {
        let supplied = "6f1c1b9e-3f7a-4c55-9d0e-2a8b1c4d5e6f";
        let res = call(
            actix_test::TestRequest::get()
                .uri("/")
                .insert_header((TRACE_ID_HEADER, supplied)),
        )
        .await;

        assert_eq!(header_trace_id(&res), supplied);
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    #[actix_web::test]
    async fn unusable_caller_id_is_replaced(#[case] supplied: &str) {
        let res = call(
            actix_test::TestRequest::get()
                .uri("/")
                .insert_header((TRACE_ID_HEADER, supplied)),
        )
        .await;

        let sent = header_trace_id(&res);
        assert_ne!(sent, supplied);
        assert!(sent.parse::<TraceId>().is_ok());
    }

    #[tokio::test]
    async fn current_is_scoped_to_the_future() {
        let id = TraceId::generate();
        assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
        assert_eq!(TraceId::current(), None);
    }
}
