//! Typed domain model for routes and their stops.
//!
//! # Responsibility
//! - Define the strongly-typed records the sequencing engine reads and writes.
//! - Keep coordinate and ordering invariants close to the data.
//!
//! # Invariants
//! - Every route and stop is identified by a stable UUID.
//! - A stop's latitude and longitude are resolved together or not at all.

pub mod route;
pub mod stop;
