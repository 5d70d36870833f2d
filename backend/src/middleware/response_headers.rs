//! Static response header decoration.
//!
//! Every response leaving the service carries the same fixed set of security,
//! caching, and informational headers. The values are constants: nothing here
//! computes an `ETag`, enforces a rate limit, or validates caches.

use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};

/// Header names (lowercase) and values applied to every response.
pub const STATIC_HEADERS: &[(&str, &str)] = &[
    ("content-security-policy", "default-src 'self'"),
    (
        "strict-transport-security",
        "max-age=31536000; includeSubDomains; preload",
    ),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("access-control-allow-origin", "*"),
    ("referrer-policy", "no-referrer"),
    ("permissions-policy", "geolocation=(), microphone=()"),
    ("cache-control", "no-cache, no-store, must-revalidate"),
    ("expires", "0"),
    ("etag", "abc123"),
    ("last-modified", "Wed, 21 Dec 2023 10:45:00 GMT"),
    ("content-disposition", "inline"),
    ("accept-ranges", "bytes"),
    ("ratelimit-limit", "100"),
    ("ratelimit-remaining", "50"),
    ("ratelimit-reset", "3600"),
    ("server", "secure-api-server"),
    ("connection", "keep-alive"),
    ("vary", "Accept-Encoding"),
];

/// Content type advertised for JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Decorate `headers` with the static table, overwriting existing values.
///
/// A bare `application/json` content type gains an explicit UTF-8 charset;
/// other content types are left alone.
///
/// # Examples
/// ```
/// use actix_web::http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
/// use users_service::middleware::response_headers::apply_static_headers;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
/// apply_static_headers(&mut headers);
/// assert_eq!(
///     headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
///     Some("application/json; charset=utf-8")
/// );
/// assert!(headers.contains_key("x-frame-options"));
/// ```
pub fn apply_static_headers(headers: &mut HeaderMap) {
    for &(name, value) in STATIC_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    let is_bare_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("application/json"));
    if is_bare_json {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        );
    }
}

/// Middleware applying [`apply_static_headers`] to every response.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use users_service::ResponseHeaders;
///
/// let app = App::new().wrap(ResponseHeaders);
/// ```
#[derive(Clone)]
pub struct ResponseHeaders;

impl<S, B> Transform<S, ServiceRequest> for ResponseHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ResponseHeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ResponseHeadersMiddleware { service }))
    }
}

/// Service wrapper produced by [`ResponseHeaders`].
pub struct ResponseHeadersMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for ResponseHeadersMiddleware<S>
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
        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            apply_static_headers(res.headers_mut());
            Ok(res)
        })
    }
}
