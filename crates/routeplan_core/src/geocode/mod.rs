//! Address-to-coordinate resolution with soft failure.

pub mod resolver;
