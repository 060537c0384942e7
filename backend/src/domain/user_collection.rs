//! Results and failures of user collection operations.

use serde::Serialize;
use serde_json::json;

use super::{Error, User, UserId};

/// Outcome of a successful add.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUsersOutcome {
    /// Number of users appended.
    pub added_count: usize,
    /// The users appended, in insertion order.
    pub added: Vec<User>,
}

/// Failures surfaced by the user collection store.
///
/// Cache failures are kept apart from domain rejections so adapters can
/// report server faults and client mistakes differently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserCollectionError {
    /// The cache engine could not be reached.
    #[error("user cache unreachable: {message}")]
    CacheConnect { message: String },
    /// Writing the collection failed; the mutation was not applied.
    #[error("failed to persist user collection: {message}")]
    CachePersist { message: String },
    /// At least one incoming id already exists or repeats within the batch.
    #[error("user ids already exist: {ids:?}")]
    DuplicateId { ids: Vec<UserId> },
    /// No user has the requested id.
    #[error("user {id} not found")]
    UserNotFound { id: UserId },
    /// The stored collection could not be read.
    #[error("could not retrieve users: {message}")]
    Retrieval { message: String },
}

impl UserCollectionError {
    /// Shorthand for [`Self::CacheConnect`].
    pub fn cache_connect(message: impl Into<String>) -> Self {
        Self::CacheConnect {
            message: message.into(),
        }
    }

    /// Shorthand for [`Self::CachePersist`].
    pub fn cache_persist(message: impl Into<String>) -> Self {
        Self::CachePersist {
            message: message.into(),
        }
    }

    /// Shorthand for [`Self::Retrieval`].
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval {
            message: message.into(),
        }
    }
}

impl From<UserCollectionError> for Error {
    fn from(value: UserCollectionError) -> Self {
        match value {
            UserCollectionError::CacheConnect { .. } => {
                Error::service_unavailable("User cache is unavailable")
            }
            UserCollectionError::CachePersist { .. } => Error::internal("Cache save operation failed"),
            UserCollectionError::DuplicateId { ids } => {
                let ids: Vec<i64> = ids.into_iter().map(UserId::get).collect();
                Error::conflict("User with the same ID already exists.")
                    .with_details(json!({ "ids": ids }))
            }
            UserCollectionError::UserNotFound { id } => {
                Error::not_found("User not found.").with_details(json!({ "id": id.get() }))
            }
            UserCollectionError::Retrieval { .. } => Error::internal("Could not retrieve users"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserCollectionError::cache_connect("refused"), ErrorCode::ServiceUnavailable)]
    #[case(UserCollectionError::cache_persist("timeout"), ErrorCode::InternalError)]
    #[case(
        UserCollectionError::DuplicateId { ids: vec![UserId::new(1)] },
        ErrorCode::Conflict
    )]
    #[case(
        UserCollectionError::UserNotFound { id: UserId::new(1) },
        ErrorCode::NotFound
    )]
    #[case(UserCollectionError::retrieval("bad reply"), ErrorCode::InternalError)]
    fn maps_to_error_codes(#[case] source: UserCollectionError, #[case] expected: ErrorCode) {
        assert_eq!(Error::from(source).code(), expected);
    }

    #[rstest]
    fn duplicate_details_list_ids() {
        let error = Error::from(UserCollectionError::DuplicateId {
            ids: vec![UserId::new(2), UserId::new(5)],
        });
        assert_eq!(error.details(), Some(&json!({ "ids": [2, 5] })));
    }
}
