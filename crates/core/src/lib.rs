//! Domain logic for page revisions.
//!
//! This crate has no internal dependencies so it can be shared by the
//! repository layer and any CLI or worker tooling.

pub mod error;
pub mod revision;
pub mod revision_history;
pub mod types;
