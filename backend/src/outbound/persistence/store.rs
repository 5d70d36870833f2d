//! Document store connection lifecycle.
//!
//! [`MongoStore`] owns the driver client (and with it the driver's connection
//! pool). It is opened once at startup, handed to adapters by clone, and shut
//! down explicitly after the HTTP server stops.

use mongodb::bson::doc;
use mongodb::{Client, Collection, Database};
use tracing::info;

use super::user_document::UserDocument;

/// Default connection string for a local MongoDB deployment.
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
/// Default database holding the users collection.
pub const DEFAULT_DATABASE: &str = "users_db";
/// Default collection name for user documents.
pub const DEFAULT_COLLECTION: &str = "users";

/// Errors that can occur while opening the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The connection string could not be parsed or the client not built.
    #[error("failed to build document store client: {message}")]
    Build { message: String },

    /// The deployment did not answer the initial ping.
    #[error("document store did not answer ping: {message}")]
    Ping { message: String },
}

impl StoreError {
    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    /// Create a ping error with the given message.
    pub fn ping(message: impl Into<String>) -> Self {
        Self::Ping {
            message: message.into(),
        }
    }
}

/// Configuration for the document store connection.
///
/// # Example
///
/// ```
/// use users_service::outbound::persistence::StoreConfig;
///
/// let config = StoreConfig::new("mongodb://db:27017")
///     .with_database("accounts")
///     .with_collection("people");
/// assert_eq!(config.database(), "accounts");
/// assert_eq!(config.collection(), "people");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    uri: String,
    database: String,
    collection: String,
}

impl StoreConfig {
    /// Create a configuration for the given connection string using the
    /// default database and collection names.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: DEFAULT_DATABASE.to_owned(),
            collection: DEFAULT_COLLECTION.to_owned(),
        }
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the collection name.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Connection string.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Database name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MONGODB_URI)
    }
}

/// Handle to the connected document store.
#[derive(Clone, Debug)]
pub struct MongoStore {
    client: Client,
    database: Database,
    collection: String,
}

impl MongoStore {
    /// Build a client for the deployment without contacting it.
    ///
    /// The driver connects lazily, so failures surface on the first
    /// operation. Startup should prefer [`MongoStore::connect`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Build`] for an unusable connection string.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(config.uri())
            .await
            .map_err(|err| StoreError::build(err.to_string()))?;
        let database = client.database(config.database());
        Ok(Self {
            client,
            database,
            collection: config.collection().to_owned(),
        })
    }

    /// Connect to the deployment and verify it answers a ping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Build`] for an unusable connection string and
    /// [`StoreError::Ping`] when no server responds.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let store = Self::open(config).await?;
        store
            .database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|err| StoreError::ping(err.to_string()))?;
        info!(
            database = config.database(),
            collection = config.collection(),
            "connected to document store"
        );
        Ok(store)
    }

    /// Typed handle to the users collection.
    pub(crate) fn users(&self) -> Collection<UserDocument> {
        self.database.collection(&self.collection)
    }

    /// Close every pooled connection and stop background monitoring.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("document store connection closed");
    }
}
