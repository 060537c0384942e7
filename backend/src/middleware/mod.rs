//! Request middleware.
//!
//! Purpose: attach a per-request trace identifier and log each request once
//! it completes.

pub mod trace;

pub use trace::Trace;
