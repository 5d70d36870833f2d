//! Driving port for user mutations.

use async_trait::async_trait;

use crate::domain::{Error, User, UserDraft, UserId, UserPatch};

/// Domain use-case port for creating, replacing, patching, and deleting
/// users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Store a new user and return it with its assigned identifier.
    async fn create_user(&self, draft: UserDraft) -> Result<User, Error>;

    /// Overwrite every writable field of an existing user.
    async fn replace_user(&self, id: &UserId, draft: UserDraft) -> Result<User, Error>;

    /// Merge the supplied fields into an existing user.
    async fn update_user(&self, id: &UserId, patch: UserPatch) -> Result<User, Error>;

    /// Remove an existing user.
    async fn delete_user(&self, id: &UserId) -> Result<(), Error>;
}
