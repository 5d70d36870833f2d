//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{error, info};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::diagnostics::trace_echo;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users;
use crate::middleware::{ResponseHeaders, Trace};
use crate::outbound::persistence::MongoUserRepository;

fn build_http_state(config: &ServerConfig) -> HttpState {
    HttpState::from_repository(Arc::new(MongoUserRepository::new(&config.store)))
}

/// Assemble the application: routes, shared state, and middleware.
///
/// `ResponseHeaders` is registered after `Trace` so it runs outermost and
/// decorates every response, including errors and unmatched routes.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::web;
/// use users_service::domain::ports::FixtureUserRepository;
/// use users_service::inbound::http::health::HealthState;
/// use users_service::inbound::http::state::HttpState;
/// use users_service::server::build_app;
///
/// let state = HttpState::from_repository(Arc::new(FixtureUserRepository::new()));
/// let _app = build_app(web::Data::new(HealthState::new()), web::Data::new(state));
/// ```
pub fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .wrap(ResponseHeaders)
        .configure(users::configure)
        .service(trace_echo)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Actix's own signal handling is disabled; pair the returned server with
/// [`drain_on_shutdown_signal`] so liveness drops before connections drain.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config));
    let bind_addr = config.bind_addr();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .disable_signals()
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "users service listening");
    health_state.mark_ready();
    Ok(server)
}

/// Mark the service as draining, then stop the server gracefully.
///
/// Liveness probes report 503 for as long as in-flight requests finish.
pub async fn drain(health_state: web::Data<HealthState>, handle: ServerHandle) {
    health_state.mark_unhealthy();
    info!("shutdown requested; draining connections");
    handle.stop(true).await;
}

/// Wait for Ctrl-C (or SIGTERM on Unix) and then [`drain`] the server.
pub async fn drain_on_shutdown_signal(
    health_state: web::Data<HealthState>,
    handle: ServerHandle,
) {
    if let Err(err) = shutdown_signal().await {
        error!(error = %err, "failed to listen for shutdown signals");
        return;
    }
    drain(health_state, handle).await;
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::HttpResponse;

    #[actix_web::test]
    async fn drain_marks_unhealthy_and_stops_the_server() {
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let server = HttpServer::new(|| {
            App::new().route("/", web::get().to(|| async { HttpResponse::Ok().finish() }))
        })
        .workers(1)
        .listen(listener)
        .expect("bind test server")
        .disable_signals()
        .run();
        let handle = server.handle();
        let running = actix_web::rt::spawn(server);

        drain(health_state.clone(), handle).await;

        assert!(!health_state.is_alive());
        running
            .await
            .expect("server task joins")
            .expect("server stops cleanly");
    }
}
