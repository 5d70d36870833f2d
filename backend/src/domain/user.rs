//! User data model.
//!
//! The canonical wire shape of a user is `{id, name, email, age}`. Write
//! payloads are modelled separately: [`UserDraft`] carries a full replacement
//! and [`UserPatch`] an arbitrary subset of fields to merge.

use std::fmt;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Number of hexadecimal characters in an encoded object id.
pub const OBJECT_ID_HEX_LEN: usize = 24;

/// Validation errors raised while building user values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    EmptyName,
    EmptyEmail,
    InvalidFieldType {
        field: &'static str,
        expected: &'static str,
    },
    ReservedField {
        field: String,
    },
    InvalidFieldName {
        field: String,
    },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "Invalid user ID"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidFieldType { field, expected } => {
                write!(f, "{field} must be {expected}")
            }
            Self::ReservedField { field } => write!(f, "{field} cannot be modified"),
            Self::InvalidFieldName { field } => {
                write!(f, "field name '{field}' is not allowed")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Store-assigned user identifier in the 24-hex-character object-id format.
///
/// # Examples
/// ```
/// use users_service::domain::UserId;
///
/// let id = UserId::new("65a1f0c2e4b0a1b2c3d4e5f6").expect("valid object id");
/// assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
/// assert!(UserId::new("42").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(ObjectId);

impl UserId {
    /// Validate and construct a [`UserId`] from its hex encoding.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.len() != OBJECT_ID_HEX_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(UserValidationError::InvalidId);
        }
        ObjectId::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a fresh identifier the way the store would.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Access the underlying object id.
    pub fn as_object_id(&self) -> &ObjectId {
        &self.0
    }
}

impl From<ObjectId> for UserId {
    fn from(value: ObjectId) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_hex()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn require_non_empty(
    value: String,
    error: UserValidationError,
) -> Result<String, UserValidationError> {
    if value.trim().is_empty() {
        Err(error)
    } else {
        Ok(value)
    }
}

/// Application user in its canonical representation.
///
/// ## Invariants
/// - `id` is assigned by the store and never changes.
/// - `name` and `email` are non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    #[schema(value_type = String, example = "65a1f0c2e4b0a1b2c3d4e5f6")]
    id: UserId,
    #[schema(example = "Ada")]
    name: String,
    #[schema(example = "ada@x.com")]
    email: String,
    #[schema(example = 36)]
    age: Option<i64>,
}

impl User {
    /// Attach a store-assigned identifier to validated user fields.
    pub fn new(id: UserId, draft: UserDraft) -> Self {
        let UserDraft { name, email, age } = draft;
        Self {
            id,
            name,
            email,
            age,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Contact email; stored verbatim.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Optional age.
    pub fn age(&self) -> Option<i64> {
        self.age
    }

    /// Return a copy with the supplied patch merged in.
    pub fn patched(&self, patch: &UserPatch) -> Self {
        let mut next = self.clone();
        if let Some(name) = patch.name() {
            name.clone_into(&mut next.name);
        }
        if let Some(email) = patch.email() {
            email.clone_into(&mut next.email);
        }
        if let Some(age) = patch.age() {
            next.age = age;
        }
        next
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDto {
    id: String,
    name: String,
    email: String,
    age: Option<i64>,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            name,
            email,
            age,
        } = value;
        Self {
            id: id.into(),
            name,
            email,
            age,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        let id = UserId::new(value.id)?;
        let draft = UserDraft::try_new(value.name, value.email, value.age)?;
        Ok(Self::new(id, draft))
    }
}

/// Complete set of writable user fields, used by create and replace.
///
/// Replacing with a draft is total: an omitted `age` clears the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    name: String,
    email: String,
    age: Option<i64>,
}

impl UserDraft {
    /// Validate and construct a draft.
    ///
    /// # Examples
    /// ```
    /// use users_service::domain::UserDraft;
    ///
    /// let draft = UserDraft::try_new("Ada", "ada@x.com", None).expect("valid draft");
    /// assert_eq!(draft.name(), "Ada");
    /// assert!(UserDraft::try_new(" ", "ada@x.com", None).is_err());
    /// ```
    pub fn try_new(
        name: impl Into<String>,
        email: impl Into<String>,
        age: Option<i64>,
    ) -> Result<Self, UserValidationError> {
        let name = require_non_empty(name.into(), UserValidationError::EmptyName)?;
        let email = require_non_empty(email.into(), UserValidationError::EmptyEmail)?;
        Ok(Self { name, email, age })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn age(&self) -> Option<i64> {
        self.age
    }
}

/// Partial update merged into an existing user.
///
/// Known fields are validated; any other field is carried through to the
/// store untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    name: Option<String>,
    email: Option<String>,
    age: Option<Option<i64>>,
    extra: Map<String, Value>,
}

impl UserPatch {
    /// Build a patch from a decoded JSON object.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use users_service::domain::UserPatch;
    ///
    /// let fields = json!({"age": 30}).as_object().cloned().unwrap_or_default();
    /// let patch = UserPatch::try_from_fields(fields).expect("valid patch");
    /// assert_eq!(patch.age(), Some(Some(30)));
    /// assert!(patch.name().is_none());
    /// ```
    pub fn try_from_fields(fields: Map<String, Value>) -> Result<Self, UserValidationError> {
        let mut patch = Self::default();
        for (field, value) in fields {
            match field.as_str() {
                "name" => patch.name = Some(non_empty_string(value, "name")?),
                "email" => patch.email = Some(non_empty_string(value, "email")?),
                "age" => patch.age = Some(optional_integer(value)?),
                "id" | "_id" => return Err(UserValidationError::ReservedField { field }),
                _ if field.is_empty() || field.starts_with('$') || field.contains('.') => {
                    return Err(UserValidationError::InvalidFieldName { field });
                }
                _ => {
                    patch.extra.insert(field, value);
                }
            }
        }
        Ok(patch)
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none() && self.extra.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// `Some(None)` clears the age; `None` leaves it untouched.
    pub fn age(&self) -> Option<Option<i64>> {
        self.age
    }

    /// Fields outside the canonical representation.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

fn non_empty_string(value: Value, field: &'static str) -> Result<String, UserValidationError> {
    let Value::String(text) = value else {
        return Err(UserValidationError::InvalidFieldType {
            field,
            expected: "a string",
        });
    };
    let error = match field {
        "email" => UserValidationError::EmptyEmail,
        _ => UserValidationError::EmptyName,
    };
    require_non_empty(text, error)
}

fn optional_integer(value: Value) -> Result<Option<i64>, UserValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => number
            .as_i64()
            .map(Some)
            .ok_or(UserValidationError::InvalidFieldType {
                field: "age",
                expected: "an integer",
            }),
        _ => Err(UserValidationError::InvalidFieldType {
            field: "age",
            expected: "an integer",
        }),
    }
}
