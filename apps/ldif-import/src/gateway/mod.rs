//! # Store Gateway
//!
//! The seams between the import engine and the outside world:
//! - [`DirectoryStore`]: queries and mutations against the identity store
//! - [`PasswordSetter`]: the out-of-band credential operation
//!
//! Every call returns a typed outcome. Callers branch on [`StoreError`]
//! variants (`DuplicateKey`, `NothingUpdated`, ...) instead of searching
//! response bodies for substrings.

mod graphql;
mod password;

pub use graphql::LldapClient;
pub use password::CommandPasswordSetter;

use ldif_import_core::SchemaTarget;
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Outcome of a failed store call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The mutation collided with an existing unique key.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The mutation matched no record; the store made no change.
    #[error("No records updated: {0}")]
    NothingUpdated(String),

    /// The store answered with any other structured error.
    #[error("Rejected by store: {0}")]
    Rejected(String),

    /// 401 Unauthorized - invalid or expired token.
    #[error("Unauthorized: invalid or expired token")]
    Unauthorized,

    /// Non-200 HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Marker of a unique-constraint violation in store error messages
/// (PostgreSQL/MySQL and SQLite backends respectively).
const DUPLICATE_KEY_MARKERS: [&str; 2] = ["duplicate key", "unique constraint failed"];

/// Marker of an update that matched nothing.
const NOTHING_UPDATED_MARKER: &str = "none of the records are updated";

/// Classify the error messages of a GraphQL response.
#[must_use]
pub fn classify_errors(messages: &[String]) -> StoreError {
    let detail = messages.join("; ");
    let lower = detail.to_lowercase();

    if lower.contains(NOTHING_UPDATED_MARKER) {
        StoreError::NothingUpdated(detail)
    } else if DUPLICATE_KEY_MARKERS.iter().any(|m| lower.contains(m)) {
        StoreError::DuplicateKey(detail)
    } else {
        StoreError::Rejected(detail)
    }
}

/// Failure of the credential operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// The operation could not be started at all.
    #[error("Cannot run password tool: {0}")]
    Unavailable(String),

    /// The operation ran and reported failure.
    #[error("Password change failed: {0}")]
    Failed(String),
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Fields of a user creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
}

/// Value of a custom attribute update.
///
/// The store receives a bare string for single values and an ordered array
/// for multi-valued attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Single(String),
    List(Vec<String>),
}

impl AttributeValue {
    /// Build from a record's values, choosing the list form for > 1 value.
    #[must_use]
    pub fn from_values(values: &[String]) -> Self {
        match values {
            [single] => Self::Single(single.clone()),
            many => Self::List(many.to_vec()),
        }
    }
}

/// An existing group as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub id: i64,
    pub display_name: String,
}

// =============================================================================
// TRAITS
// =============================================================================

/// Query/mutation surface of the target identity store.
///
/// Implementations perform exactly one request per call and never retry;
/// retries belong to the reconciliation engine.
#[allow(async_fn_in_trait)]
pub trait DirectoryStore {
    /// Names of all user and group attributes in the store schema.
    async fn list_attribute_names(&self) -> StoreResult<Vec<String>>;

    /// All existing groups.
    async fn list_groups(&self) -> StoreResult<Vec<GroupRef>>;

    /// Declare a visible, editable STRING attribute.
    async fn add_attribute(
        &self,
        target: SchemaTarget,
        name: &str,
        is_list: bool,
    ) -> StoreResult<()>;

    async fn create_user(&self, user: &NewUser) -> StoreResult<()>;

    async fn delete_user(&self, user_id: &str) -> StoreResult<()>;

    /// Canonical identifier stored for `user_id`, `None` when absent.
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<String>>;

    /// Replace the avatar (base64 image data).
    async fn update_avatar(&self, user_id: &str, avatar: &str) -> StoreResult<()>;

    /// Set a custom attribute on a user.
    async fn insert_user_attribute(
        &self,
        user_id: &str,
        name: &str,
        value: &AttributeValue,
    ) -> StoreResult<()>;

    /// Create a group and return its numeric identifier.
    async fn create_group(&self, name: &str) -> StoreResult<i64>;

    async fn add_user_to_group(&self, user_id: &str, group_id: i64) -> StoreResult<()>;
}

/// Out-of-band password operation.
///
/// Treated as atomic and non-retryable; the caller decides about fallbacks.
#[allow(async_fn_in_trait)]
pub trait PasswordSetter {
    async fn set_password(&self, user_id: &str, password: &str) -> Result<(), PasswordError>;
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_duplicate_key_messages() {
        let pg = vec!["duplicate key value violates unique constraint \"users_email\"".to_string()];
        assert!(matches!(classify_errors(&pg), StoreError::DuplicateKey(_)));

        let sqlite = vec!["UNIQUE constraint failed: users.email".to_string()];
        assert!(matches!(classify_errors(&sqlite), StoreError::DuplicateKey(_)));
    }

    #[test]
    fn classify_nothing_updated_separately() {
        let messages = vec!["None of the records are updated".to_string()];
        assert_eq!(
            classify_errors(&messages),
            StoreError::NothingUpdated("None of the records are updated".to_string())
        );
    }

    #[test]
    fn classify_other_errors_as_rejected() {
        let messages = vec!["Entity not found".to_string(), "second".to_string()];
        assert_eq!(
            classify_errors(&messages),
            StoreError::Rejected("Entity not found; second".to_string())
        );
    }

    #[test]
    fn attribute_value_shape() {
        let single = AttributeValue::from_values(&["a".to_string()]);
        assert_eq!(serde_json::to_value(&single).expect("json"), serde_json::json!("a"));

        let list = AttributeValue::from_values(&["b".to_string(), "a".to_string()]);
        assert_eq!(serde_json::to_value(&list).expect("json"), serde_json::json!(["b", "a"]));
    }

    #[test]
    fn new_user_uses_camel_case() {
        let user = NewUser {
            id: "bob".to_string(),
            email: "bob@x.com".to_string(),
            display_name: "Bob".to_string(),
            first_name: "Bob".to_string(),
            last_name: "Jones".to_string(),
        };
        let json = serde_json::to_value(&user).expect("json");
        assert_eq!(json["displayName"], "Bob");
        assert_eq!(json["lastName"], "Jones");
    }
}
