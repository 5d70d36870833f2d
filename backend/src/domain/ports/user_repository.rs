//! Driven port for user persistence adapters and their errors.
//!
//! Every operation maps to a single call against the backing collection.
//! Mutations that target one document report absence with `None`/`false`
//! rather than an error so the domain service decides how to surface it.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{User, UserDraft, UserId, UserPatch};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserPersistenceError {
    /// The store could not be reached.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
}

impl UserPersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Return every stored user in store iteration order.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Report whether a document with the identifier exists.
    async fn exists(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// Insert a new document and return it with its assigned identifier.
    async fn insert(&self, draft: &UserDraft) -> Result<User, UserPersistenceError>;

    /// Overwrite every field of an existing document, returning the result.
    async fn replace(
        &self,
        id: &UserId,
        draft: &UserDraft,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Merge the patch into an existing document, returning the result.
    async fn update(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove a document, reporting whether one matched.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    extra: Map<String, Value>,
}

/// In-memory repository for handler-level tests and wiring checks that must
/// not depend on a running document store.
///
/// Documents are kept in insertion order, which doubles as iteration order.
#[derive(Debug, Default)]
pub struct FixtureUserRepository {
    documents: Mutex<Vec<StoredUser>>,
}

impl FixtureUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields stored on a document beyond the canonical representation.
    pub fn extra_fields(&self, id: &UserId) -> Option<Map<String, Value>> {
        let documents = self.documents.lock().ok()?;
        documents
            .iter()
            .find(|stored| stored.user.id() == id)
            .map(|stored| stored.extra.clone())
    }

    fn with_documents<T>(
        &self,
        f: impl FnOnce(&mut Vec<StoredUser>) -> T,
    ) -> Result<T, UserPersistenceError> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| UserPersistenceError::query("fixture user store lock poisoned"))?;
        Ok(f(&mut documents))
    }
}

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        self.with_documents(|documents| {
            documents
                .iter()
                .map(|stored| stored.user.clone())
                .collect()
        })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.with_documents(|documents| {
            documents
                .iter()
                .find(|stored| stored.user.id() == id)
                .map(|stored| stored.user.clone())
        })
    }

    async fn exists(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        self.with_documents(|documents| documents.iter().any(|stored| stored.user.id() == id))
    }

    async fn insert(&self, draft: &UserDraft) -> Result<User, UserPersistenceError> {
        let user = User::new(UserId::generate(), draft.clone());
        self.with_documents(|documents| {
            documents.push(StoredUser {
                user: user.clone(),
                extra: Map::new(),
            });
        })?;
        Ok(user)
    }

    async fn replace(
        &self,
        id: &UserId,
        draft: &UserDraft,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.with_documents(|documents| {
            let stored = documents.iter_mut().find(|stored| stored.user.id() == id)?;
            *stored = StoredUser {
                user: User::new(*id, draft.clone()),
                extra: Map::new(),
            };
            Some(stored.user.clone())
        })
    }

    async fn update(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.with_documents(|documents| {
            let stored = documents.iter_mut().find(|stored| stored.user.id() == id)?;
            stored.user = stored.user.patched(patch);
            stored
                .extra
                .extend(patch.extra().iter().map(|(k, v)| (k.clone(), v.clone())));
            Some(stored.user.clone())
        })
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        self.with_documents(|documents| {
            let before = documents.len();
            documents.retain(|stored| stored.user.id() != id);
            documents.len() != before
        })
    }
}
