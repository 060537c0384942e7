//! Domain model and use-cases.
//!
//! Purpose: define the user record, the cache-backed collection store, and
//! the transport-agnostic error envelope. Nothing here knows about HTTP or
//! about a concrete cache engine; both sit behind [`ports`].
//!
//! Public surface:
//! - `User`, `UserId`, `UserPatch`, `NewUsers`: the record and its inputs.
//! - `UserCollectionService`: single-key read-modify-write store.
//! - `UserCollectionError`, `AddUsersOutcome`: store results.
//! - `Error`, `ErrorCode`: envelope handed to inbound adapters.
//! - `TraceId`: request correlation identifier.

pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_collection;
pub mod user_collection_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{NewUsers, User, UserId, UserPatch};
pub use self::user_collection::{AddUsersOutcome, UserCollectionError};
pub use self::user_collection_service::{DEFAULT_USERS_TTL, UserCollectionService};
