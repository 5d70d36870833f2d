//! MongoDB-backed `UserRepository` adapter.
//!
//! Single-document mutations use find-and-modify commands returning the
//! post-image, so the call that mutates also decides whether the id matched.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::ReturnDocument;
use tracing::{debug, error};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserDraft, UserId, UserPatch};

use super::store::MongoStore;
use super::user_document::{UserDocument, decode_listed, patch_set_document};

/// Repository persisting users as documents in a single collection.
#[derive(Clone, Debug)]
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    /// Create a repository over the store's users collection.
    pub fn new(store: &MongoStore) -> Self {
        Self {
            collection: store.users(),
        }
    }
}

fn id_filter(id: &UserId) -> Document {
    doc! { "_id": *id.as_object_id() }
}

fn map_driver_error(err: MongoError) -> UserPersistenceError {
    error!(error = %err, "user collection operation failed");
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
            UserPersistenceError::connection(err.to_string())
        }
        _ => UserPersistenceError::query(err.to_string()),
    }
}

fn inserted_user_id(inserted: &Bson) -> Result<UserId, UserPersistenceError> {
    inserted.as_object_id().map(UserId::from).ok_or_else(|| {
        UserPersistenceError::query(format!(
            "store assigned a non object-id identifier: {inserted}"
        ))
    })
}

fn decode(document: Option<UserDocument>) -> Result<Option<User>, UserPersistenceError> {
    document.map(User::try_from).transpose()
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        // Raw documents, so one malformed entry cannot fail the whole cursor.
        let documents: Vec<Document> = self
            .collection
            .clone_with_type::<Document>()
            .find(doc! {})
            .await
            .map_err(map_driver_error)?
            .try_collect()
            .await
            .map_err(map_driver_error)?;
        Ok(decode_listed(documents))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let document = self
            .collection
            .find_one(id_filter(id))
            .await
            .map_err(map_driver_error)?;
        decode(document)
    }

    async fn exists(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let count = self
            .collection
            .count_documents(id_filter(id))
            .limit(1)
            .await
            .map_err(map_driver_error)?;
        Ok(count > 0)
    }

    async fn insert(&self, draft: &UserDraft) -> Result<User, UserPersistenceError> {
        let result = self
            .collection
            .insert_one(UserDocument::from(draft))
            .await
            .map_err(map_driver_error)?;
        let id = inserted_user_id(&result.inserted_id)?;
        debug!(user_id = %id, "user inserted");
        Ok(User::new(id, draft.clone()))
    }

    async fn replace(
        &self,
        id: &UserId,
        draft: &UserDraft,
    ) -> Result<Option<User>, UserPersistenceError> {
        let document = self
            .collection
            .find_one_and_replace(id_filter(id), UserDocument::from(draft))
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_driver_error)?;
        decode(document)
    }

    async fn update(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        let set = patch_set_document(patch)?;
        let document = self
            .collection
            .find_one_and_update(id_filter(id), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_driver_error)?;
        decode(document)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let result = self
            .collection
            .delete_one(id_filter(id))
            .await
            .map_err(map_driver_error)?;
        if result.deleted_count > 0 {
            debug!(user_id = %id, "user deleted");
        }
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use rstest::rstest;

    #[rstest]
    fn io_failures_are_connection_errors() {
        let err = MongoError::from(std::io::ErrorKind::ConnectionRefused);
        assert!(matches!(
            map_driver_error(err),
            UserPersistenceError::Connection { .. }
        ));
    }

    #[rstest]
    fn other_driver_failures_are_query_errors() {
        let err = MongoError::custom("write conflict");
        assert!(matches!(
            map_driver_error(err),
            UserPersistenceError::Query { .. }
        ));
    }

    #[rstest]
    fn object_id_becomes_the_user_id() {
        let oid = ObjectId::new();
        let id = inserted_user_id(&Bson::ObjectId(oid)).expect("object id accepted");
        assert_eq!(id.as_object_id(), &oid);
    }

    #[rstest]
    #[case(Bson::String("custom-id".to_owned()))]
    #[case(Bson::Int64(7))]
    fn foreign_inserted_ids_are_query_errors(#[case] inserted: Bson) {
        let err = inserted_user_id(&inserted).expect_err("non object id rejected");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
