//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the stop/route store contracts the sequencing engine consumes.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Stop writes must pass `Stop::validate()` before persistence.
//! - Per-stop updates never require a whole-route transaction.
//! - Updating a missing row reports `RepoError::NotFound`.

pub mod route_repo;
pub mod stop_repo;
