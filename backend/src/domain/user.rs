//! User record model.
//!
//! A user carries one caller-supplied integer identifier plus arbitrary
//! additional fields (username, email, ...). The store never interprets those
//! fields beyond copying them through and merging them on update.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON field holding the identifier.
pub const ID_FIELD: &str = "id";

/// Caller-supplied user identifier, unique within the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A user record as stored in the collection.
///
/// Serialises as a flat JSON object: `{"id": 1, "username": "ada", ...}`.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use user_cache::domain::{User, UserId};
///
/// let user: User = serde_json::from_value(json!({"id": 7, "username": "ada"}))
///     .expect("valid user");
/// assert_eq!(user.id(), UserId::new(7));
/// assert_eq!(user.field("username"), Some(&json!("ada")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl User {
    /// Build a user from an identifier and its additional fields.
    ///
    /// An `id` entry inside `fields` is discarded; the explicit identifier
    /// wins.
    #[must_use]
    pub fn new(id: UserId, mut fields: Map<String, Value>) -> Self {
        fields.remove(ID_FIELD);
        Self { id, fields }
    }

    /// Identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Additional fields, excluding `id`.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up one additional field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Shallow-merge `patch` over this user's fields. The identifier is
    /// never overwritten.
    pub fn merge(&mut self, patch: &UserPatch) {
        for (key, value) in patch.fields() {
            self.fields.insert(key.clone(), value.clone());
        }
    }
}

/// Partial field set applied by an update.
///
/// Any `id` key is stripped on construction so identity cannot change
/// through an update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct UserPatch(Map<String, Value>);

impl UserPatch {
    /// Build a patch, dropping any `id` entry.
    #[must_use]
    pub fn new(mut fields: Map<String, Value>) -> Self {
        fields.remove(ID_FIELD);
        Self(fields)
    }

    /// Fields to merge.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for UserPatch {
    fn from(value: Map<String, Value>) -> Self {
        Self::new(value)
    }
}

/// Input to an add: a single user or a batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NewUsers {
    /// One user object.
    One(User),
    /// A JSON array of users.
    Many(Vec<User>),
}

impl NewUsers {
    /// Normalise into a sequence, wrapping a single user.
    #[must_use]
    pub fn into_vec(self) -> Vec<User> {
        match self {
            Self::One(user) => vec![user],
            Self::Many(users) => users,
        }
    }
}

impl From<User> for NewUsers {
    fn from(value: User) -> Self {
        Self::One(value)
    }
}

impl From<Vec<User>> for NewUsers {
    fn from(value: Vec<User>) -> Self {
        Self::Many(value)
    }
}
