//! Route store contract and SQLite implementation.
//!
//! # Invariants
//! - `last_optimized_at` is written only through `update_last_optimized`.
//! - Deleting a route cascades to its stops at the schema level.

use crate::model::route::{Route, RouteId, RouteProgress};
use crate::repo::stop_repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection};

/// Route persistence contract.
pub trait RouteStore {
    /// Stamps the route with the time of its last successful optimization.
    fn update_last_optimized(&self, route_id: RouteId, optimized_at: i64) -> RepoResult<()>;
    fn create_route(&self, route: &Route) -> RepoResult<RouteId>;
    fn get_route(&self, route_id: RouteId) -> RepoResult<Option<Route>>;
    /// Counts stops per visit status.
    fn route_progress(&self, route_id: RouteId) -> RepoResult<RouteProgress>;
}

impl<T: RouteStore + ?Sized> RouteStore for &T {
    fn update_last_optimized(&self, route_id: RouteId, optimized_at: i64) -> RepoResult<()> {
        (**self).update_last_optimized(route_id, optimized_at)
    }

    fn create_route(&self, route: &Route) -> RepoResult<RouteId> {
        (**self).create_route(route)
    }

    fn get_route(&self, route_id: RouteId) -> RepoResult<Option<Route>> {
        (**self).get_route(route_id)
    }

    fn route_progress(&self, route_id: RouteId) -> RepoResult<RouteProgress> {
        (**self).route_progress(route_id)
    }
}

/// SQLite-backed route store.
pub struct SqliteRouteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRouteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RouteStore for SqliteRouteRepository<'_> {
    fn update_last_optimized(&self, route_id: RouteId, optimized_at: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE routes SET last_optimized_at = ?2 WHERE uuid = ?1;",
            params![route_id.to_string(), optimized_at],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(route_id));
        }
        Ok(())
    }

    fn create_route(&self, route: &Route) -> RepoResult<RouteId> {
        if route.rep_id.trim().is_empty() {
            return Err(RepoError::InvalidData("route rep_id must not be blank".to_string()));
        }

        self.conn.execute(
            "INSERT INTO routes (uuid, rep_id, route_date, title, last_optimized_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                route.uuid.to_string(),
                route.rep_id.as_str(),
                route.route_date.as_str(),
                route.title.as_deref(),
                route.last_optimized_at,
            ],
        )?;
        Ok(route.uuid)
    }

    fn get_route(&self, route_id: RouteId) -> RepoResult<Option<Route>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, rep_id, route_date, title, last_optimized_at
             FROM routes
             WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([route_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(Route {
                uuid: parse_uuid(row.get("uuid")?, "routes.uuid")?,
                rep_id: row.get("rep_id")?,
                route_date: row.get("route_date")?,
                title: row.get("title")?,
                last_optimized_at: row.get("last_optimized_at")?,
            }));
        }
        Ok(None)
    }

    fn route_progress(&self, route_id: RouteId) -> RepoResult<RouteProgress> {
        let progress = self.conn.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(status = 'finished'), 0),
                COALESCE(SUM(status = 'skipped'), 0),
                COALESCE(SUM(status = 'pending'), 0)
             FROM stops
             WHERE route_uuid = ?1;",
            [route_id.to_string()],
            |row| {
                Ok(RouteProgress {
                    total: row.get(0)?,
                    finished: row.get(1)?,
                    skipped: row.get(2)?,
                    pending: row.get(3)?,
                })
            },
        )?;
        Ok(progress)
    }
}
