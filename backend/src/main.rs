//! Users service entry-point: loads settings, opens the document store, and
//! serves the REST API until shutdown.

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use users_service::config::ServiceSettings;
use users_service::inbound::http::health::HealthState;
use users_service::outbound::persistence::MongoStore;
use users_service::server::{ServerConfig, create_server, drain_on_shutdown_signal};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::load().map_err(|e| {
        error!(error = %e, "failed to load settings");
        std::io::Error::other(format!("failed to load settings: {e}"))
    })?;
    let bind_addr = settings.socket_addr().map_err(std::io::Error::other)?;

    let store = MongoStore::connect(&settings.store_config())
        .await
        .map_err(|e| {
            error!(error = %e, "document store unavailable at startup");
            std::io::Error::other(e)
        })?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(bind_addr, store.clone());
    let server = create_server(health_state.clone(), config)?;
    actix_web::rt::spawn(drain_on_shutdown_signal(
        health_state.clone(),
        server.handle(),
    ));

    let result = server.await;
    store.shutdown().await;
    info!("users service stopped");
    result
}
