//! Shared helpers for tests that talk to a document store.
//!
//! Suites needing a live MongoDB read its connection string from
//! `USERS_SERVICE_TEST_MONGODB_URI`. When the variable is unset they print a
//! skip marker and return early, so local runs without a database stay green
//! while CI can opt in.

use mongodb::bson::oid::ObjectId;
use users_service::outbound::persistence::StoreConfig;

/// Environment variable naming the live deployment used by store tests.
pub const TEST_MONGODB_URI_ENV: &str = "USERS_SERVICE_TEST_MONGODB_URI";

/// Connection string that no server answers, with a short selection timeout.
pub const UNREACHABLE_MONGODB_URI: &str =
    "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200";

/// Configuration for a uniquely named collection on the live deployment.
///
/// Returns `None`, after printing a skip marker, when no deployment is set.
pub fn live_store_config(suite: &str) -> Option<StoreConfig> {
    match std::env::var(TEST_MONGODB_URI_ENV) {
        Ok(uri) if !uri.trim().is_empty() => Some(
            StoreConfig::new(uri)
                .with_database("users_service_tests")
                .with_collection(format!("{suite}_{}", ObjectId::new().to_hex())),
        ),
        _ => {
            eprintln!("SKIP-TEST-STORE: {suite}: set {TEST_MONGODB_URI_ENV} to run");
            None
        }
    }
}

/// Configuration pointing at a deployment that never answers.
pub fn unreachable_store_config() -> StoreConfig {
    StoreConfig::new(UNREACHABLE_MONGODB_URI)
}
