//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror the wire shape of their domain counterparts and are
//! registered under the domain type names.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request body or path is malformed.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No user carries the requested id.
    #[schema(rename = "not_found")]
    NotFound,
    /// An added user reuses an existing id.
    #[schema(rename = "conflict")]
    Conflict,
    /// The cache could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "User not found.")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(rename = "traceId", example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details, such as the conflicting ids.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`].
///
/// Only `id` is fixed; every other property is stored verbatim.
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    /// Integer user identifier, unique within the collection.
    #[schema(example = 1)]
    id: i64,
    /// Example free-form property.
    #[schema(example = "Ada Lovelace")]
    name: Option<String>,
}

/// OpenAPI schema for [`crate::domain::UserPatch`].
///
/// Any JSON object; each property overwrites the user's property of the
/// same name. A supplied `id` is discarded.
#[derive(ToSchema)]
#[schema(as = crate::domain::UserPatch)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserPatchSchema {
    /// Example property to overwrite.
    #[schema(example = "Grace Hopper")]
    name: Option<String>,
}

/// OpenAPI schema for [`crate::domain::AddUsersOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::AddUsersOutcome)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AddUsersOutcomeSchema {
    /// Number of users appended.
    #[schema(rename = "addedCount", example = 1)]
    added_count: usize,
    /// The appended users, in request order.
    added: Vec<UserSchema>,
}
