//! User resource domain service.
//!
//! Implements the [`UsersQuery`] and [`UsersCommand`] driving ports on top of
//! a [`UserRepository`]. Each operation issues exactly one repository call;
//! a repository reporting no match becomes a `not_found` error.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository, UsersCommand, UsersQuery};
use crate::domain::{Error, User, UserDraft, UserId, UserPatch};

/// Message returned whenever an identifier matches no stored user.
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

/// User service implementing the driving ports.
#[derive(Clone)]
pub struct UserService<R> {
    repository: Arc<R>,
}

impl<R> UserService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn found<T>(value: Option<T>) -> Result<T, Error> {
    value.ok_or_else(|| Error::not_found(USER_NOT_FOUND_MESSAGE))
}

#[async_trait]
impl<R> UsersQuery for UserService<R>
where
    R: UserRepository + 'static,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.repository.list().await.map_err(map_persistence_error)
    }

    async fn fetch_user(&self, id: &UserId) -> Result<User, Error> {
        let user = self
            .repository
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?;
        found(user)
    }

    async fn ensure_user_exists(&self, id: &UserId) -> Result<(), Error> {
        let exists = self
            .repository
            .exists(id)
            .await
            .map_err(map_persistence_error)?;
        found(exists.then_some(()))
    }
}

#[async_trait]
impl<R> UsersCommand for UserService<R>
where
    R: UserRepository + 'static,
{
    async fn create_user(&self, draft: UserDraft) -> Result<User, Error> {
        self.repository
            .insert(&draft)
            .await
            .map_err(map_persistence_error)
    }

    async fn replace_user(&self, id: &UserId, draft: UserDraft) -> Result<User, Error> {
        let user = self
            .repository
            .replace(id, &draft)
            .await
            .map_err(map_persistence_error)?;
        found(user)
    }

    async fn update_user(&self, id: &UserId, patch: UserPatch) -> Result<User, Error> {
        let result = if patch.is_empty() {
            // Nothing to merge; the store rejects an empty `$set`.
            self.repository.find_by_id(id).await
        } else {
            self.repository.update(id, &patch).await
        };
        found(result.map_err(map_persistence_error)?)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), Error> {
        let deleted = self
            .repository
            .delete(id)
            .await
            .map_err(map_persistence_error)?;
        found(deleted.then_some(()))
    }
}
