//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. The pool is created once at
//! startup and handed to every caller; repositories keep no state.

pub mod revision_repo;
pub mod user_repo;

pub use revision_repo::RevisionRepo;
pub use user_repo::UserRepo;
