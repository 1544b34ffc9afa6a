//! Route domain model.
//!
//! # Responsibility
//! - Describe one rep's stop collection for one calendar date.
//!
//! # Invariants
//! - `last_optimized_at` is only written by a successful optimization run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a route.
pub type RouteId = Uuid;

/// One rep's collection of stops for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub uuid: RouteId,
    /// Opaque identifier of the assigned rep.
    pub rep_id: String,
    /// Calendar date in `YYYY-MM-DD` form.
    pub route_date: String,
    pub title: Option<String>,
    /// Unix epoch milliseconds of the last successful optimization.
    pub last_optimized_at: Option<i64>,
}

impl Route {
    /// Creates a new, never-optimized route with a generated ID.
    pub fn new(rep_id: impl Into<String>, route_date: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            rep_id: rep_id.into(),
            route_date: route_date.into(),
            title: None,
            last_optimized_at: None,
        }
    }
}

/// Per-status stop counts for one route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouteProgress {
    pub total: u32,
    pub finished: u32,
    pub skipped: u32,
    pub pending: u32,
}

impl RouteProgress {
    /// Stops that no longer need a visit.
    pub fn completed(&self) -> u32 {
        self.finished + self.skipped
    }
}
