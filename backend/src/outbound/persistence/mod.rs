//! MongoDB persistence adapters.
//!
//! This module provides the concrete implementation of the user repository
//! port backed by a single MongoDB collection.
//!
//! - **Thin adapters**: the repository only translates between BSON
//!   documents and domain types. No business logic resides here.
//! - **Internal models**: the `UserDocument` BSON shape is an
//!   implementation detail, never exposed to the domain layer.
//! - **Explicit lifecycle**: [`MongoStore`] is opened at startup and shut
//!   down after the server stops; adapters borrow collection handles from it.
//!
//! # Example
//!
//! ```no_run
//! use users_service::outbound::persistence::{MongoStore, MongoUserRepository, StoreConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MongoStore::connect(&StoreConfig::default()).await?;
//! let repository = MongoUserRepository::new(&store);
//! # drop(repository);
//! store.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod mongo_user_repository;
mod store;
mod user_document;

pub use mongo_user_repository::MongoUserRepository;
pub use store::{
    DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_MONGODB_URI, MongoStore, StoreConfig,
    StoreError,
};
