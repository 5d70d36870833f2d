//! BSON shape of a stored user and conversions to and from domain types.
//!
//! Documents may carry fields beyond the canonical ones (written through
//! partial updates); they are ignored when decoding.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Document};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::ports::UserPersistenceError;
use crate::domain::{User, UserDraft, UserPatch};

/// Stored user document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<ObjectId>,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) age: Option<i64>,
}

impl From<&UserDraft> for UserDocument {
    fn from(draft: &UserDraft) -> Self {
        Self {
            id: None,
            name: draft.name().to_owned(),
            email: draft.email().to_owned(),
            age: draft.age(),
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = UserPersistenceError;

    fn try_from(document: UserDocument) -> Result<Self, Self::Error> {
        let UserDocument {
            id,
            name,
            email,
            age,
        } = document;
        let id = id.ok_or_else(|| UserPersistenceError::query("stored user has no _id"))?;
        let draft = UserDraft::try_new(name, email, age).map_err(|err| {
            UserPersistenceError::query(format!("stored user {id} is invalid: {err}"))
        })?;
        Ok(User::new(id.into(), draft))
    }
}

/// Decode a listing, skipping documents that do not form a valid user.
///
/// Each skipped document is logged with its `_id` so it can be repaired.
pub(crate) fn decode_listed(documents: Vec<Document>) -> Vec<User> {
    documents
        .into_iter()
        .filter_map(|raw| {
            let document_id = raw.get("_id").cloned();
            let decoded = bson::from_document::<UserDocument>(raw)
                .map_err(|err| {
                    UserPersistenceError::query(format!("stored user cannot be decoded: {err}"))
                })
                .and_then(User::try_from);
            match decoded {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!(error = %err, ?document_id, "skipping invalid stored user");
                    None
                }
            }
        })
        .collect()
}

/// Build the `$set` body merging a patch into a stored document.
pub(crate) fn patch_set_document(patch: &UserPatch) -> Result<Document, UserPersistenceError> {
    let mut set = Document::new();
    if let Some(name) = patch.name() {
        set.insert("name", name);
    }
    if let Some(email) = patch.email() {
        set.insert("email", email);
    }
    if let Some(age) = patch.age() {
        set.insert("age", age);
    }
    for (field, value) in patch.extra() {
        let value = bson::to_bson(value).map_err(|err| {
            UserPersistenceError::query(format!("field {field} cannot be stored: {err}"))
        })?;
        set.insert(field.as_str(), value);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{Bson, doc};
    use rstest::rstest;
    use serde_json::json;

    fn patch(value: serde_json::Value) -> UserPatch {
        UserPatch::try_from_fields(value.as_object().cloned().expect("object"))
            .expect("valid patch")
    }

    #[rstest]
    fn draft_document_stores_null_age_and_no_id() {
        let draft = UserDraft::try_new("Ada", "ada@x.com", None).expect("valid draft");
        let document =
            bson::to_document(&UserDocument::from(&draft)).expect("document serialises");

        assert_eq!(
            document,
            doc! { "name": "Ada", "email": "ada@x.com", "age": Bson::Null }
        );
    }

    #[rstest]
    fn stored_document_decodes_ignoring_extra_fields() {
        let id = ObjectId::new();
        let stored = doc! {
            "_id": id,
            "name": "Ada",
            "email": "ada@x.com",
            "age": 36_i32,
            "nickname": "countess",
        };
        let document: UserDocument = bson::from_document(stored).expect("document decodes");
        let user = User::try_from(document).expect("valid user");

        assert_eq!(user.id().as_object_id(), &id);
        assert_eq!(user.age(), Some(36));
    }

    #[rstest]
    fn document_without_id_is_rejected() {
        let document = UserDocument {
            id: None,
            name: "Ada".to_owned(),
            email: "ada@x.com".to_owned(),
            age: None,
        };
        assert!(matches!(
            User::try_from(document),
            Err(UserPersistenceError::Query { .. })
        ));
    }

    #[rstest]
    fn listing_skips_invalid_documents() {
        let valid = ObjectId::new();
        let documents = vec![
            doc! { "_id": valid, "name": "Ada", "email": "ada@x.com", "age": 36_i64 },
            doc! { "_id": ObjectId::new(), "name": "", "email": "blank@x.com" },
            doc! { "_id": ObjectId::new(), "email": "nameless@x.com" },
            doc! { "_id": ObjectId::new(), "name": 42_i64, "email": "typed@x.com" },
        ];

        let users = decode_listed(documents);

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id().as_object_id(), &valid);
        assert_eq!(users[0].name(), "Ada");
    }

    #[rstest]
    fn set_document_contains_only_supplied_fields() {
        let set = patch_set_document(&patch(json!({"age": 30, "nickname": "countess"})))
            .expect("set document");

        assert_eq!(set, doc! { "age": 30_i64, "nickname": "countess" });
    }

    #[rstest]
    fn set_document_clears_age_with_null() {
        let set = patch_set_document(&patch(json!({"age": null}))).expect("set document");
        assert_eq!(set.get("age"), Some(&Bson::Null));
    }
}
