//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters translate between domain types and engine-specific
//! representations. They contain no business logic.

pub mod cache;
