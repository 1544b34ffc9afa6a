//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and provider calls into use-case level APIs.
//! - Keep CLI callers decoupled from storage and HTTP details.

pub mod optimize_service;
pub mod stop_service;
