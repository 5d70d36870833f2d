//! Driving port for user reads.
//!
//! Inbound adapters (HTTP handlers) use this port to fetch user-visible data
//! without importing outbound persistence concerns.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Return every user in store iteration order.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Return the user with the given identifier or a `not_found` error.
    async fn fetch_user(&self, id: &UserId) -> Result<User, Error>;

    /// Succeed when the user exists; `not_found` otherwise.
    async fn ensure_user_exists(&self, id: &UserId) -> Result<(), Error>;
}
