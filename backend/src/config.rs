//! Service settings loaded via OrthoConfig.
//!
//! Values are layered from CLI flags, `USERS_SERVICE_*` environment variables,
//! and an optional configuration file, over the defaults declared on each
//! field.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::outbound::persistence::{
    DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_MONGODB_URI, StoreConfig,
};

/// Address the HTTP listener binds when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {message}")]
    InvalidBindAddr { value: String, message: String },
}

/// Runtime settings for the users service.
///
/// Every field carries a default, so loading succeeds with no flags,
/// environment variables, or configuration file present.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERS_SERVICE")]
pub struct ServiceSettings {
    /// Socket address for the HTTP listener.
    #[ortho_config(default = DEFAULT_BIND_ADDR.to_owned())]
    pub bind_addr: String,
    /// MongoDB connection string.
    #[ortho_config(default = DEFAULT_MONGODB_URI.to_owned())]
    pub mongodb_uri: String,
    /// Database holding the users collection.
    #[ortho_config(default = DEFAULT_DATABASE.to_owned())]
    pub database: String,
    /// Collection storing user documents.
    #[ortho_config(default = DEFAULT_COLLECTION.to_owned())]
    pub collection: String,
}

impl ServiceSettings {
    /// Parse the configured bind address.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidBindAddr`] when the value is not a
    /// socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
                value: self.bind_addr.clone(),
                message: err.to_string(),
            })
    }

    /// Build the document store configuration from these settings.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.mongodb_uri.as_str())
            .with_database(self.database.as_str())
            .with_collection(self.collection.as_str())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "USERS_SERVICE_BIND_ADDR",
        "USERS_SERVICE_MONGODB_URI",
        "USERS_SERVICE_DATABASE",
        "USERS_SERVICE_COLLECTION",
    ];

    fn load_from_empty_args() -> ServiceSettings {
        ServiceSettings::load_from_iter([OsString::from("users-service")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.socket_addr(),
            Ok(SocketAddr::from(([0, 0, 0, 0], 8000)))
        );
        assert_eq!(settings.mongodb_uri, "mongodb://localhost:27017");
        assert_eq!(settings.database, "users_db");
        assert_eq!(settings.collection, "users");
        assert_eq!(settings.store_config(), StoreConfig::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("USERS_SERVICE_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            (
                "USERS_SERVICE_MONGODB_URI",
                Some("mongodb://db.internal:27017".to_owned()),
            ),
            ("USERS_SERVICE_DATABASE", Some("accounts".to_owned())),
            ("USERS_SERVICE_COLLECTION", Some("people".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.socket_addr(),
            Ok(SocketAddr::from(([127, 0, 0, 1], 9090)))
        );
        let store = settings.store_config();
        assert_eq!(store.uri(), "mongodb://db.internal:27017");
        assert_eq!(store.database(), "accounts");
        assert_eq!(store.collection(), "people");
    }

    #[rstest]
    fn unparsable_bind_address_is_rejected() {
        let _guard = lock_env([
            ("USERS_SERVICE_BIND_ADDR", Some("localhost".to_owned())),
            ("USERS_SERVICE_MONGODB_URI", None),
            ("USERS_SERVICE_DATABASE", None),
            ("USERS_SERVICE_COLLECTION", None),
        ]);

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.socket_addr(),
            Err(SettingsError::InvalidBindAddr { ref value, .. }) if value == "localhost"
        ));
    }
}
