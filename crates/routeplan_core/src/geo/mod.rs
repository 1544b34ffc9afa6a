//! Pure geometric sequencing: great-circle distance and the greedy fallback.
//!
//! # Invariants
//! - Nothing in this module performs I/O.
//! - Outputs depend only on input order and coordinates.

pub mod distance;
pub mod heuristic;
