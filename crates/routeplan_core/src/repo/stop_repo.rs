//! Stop store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stop CRUD plus the narrow coordinate/order updates used by
//!   route optimization.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `list_stops` returns stops in visiting order (`sort_order`, then uuid).
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::route::RouteId;
use crate::model::stop::{Coordinates, Stop, StopId, StopStatus, StopValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const STOP_SELECT_SQL: &str = "SELECT
    uuid,
    route_uuid,
    sort_order,
    address,
    phone,
    email,
    notes,
    status,
    completed_at,
    lat,
    lng,
    geocode_provider,
    geocoded_at
FROM stops";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by stop and route stores.
#[derive(Debug)]
pub enum RepoError {
    Validation(StopValidationError),
    Db(DbError),
    NotFound(Uuid),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<StopValidationError> for RepoError {
    fn from(value: StopValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Stop persistence contract.
pub trait StopStore {
    /// Returns every stop of a route in current visiting order.
    fn list_stops(&self, route_id: RouteId) -> RepoResult<Vec<Stop>>;
    /// Persists resolved coordinates with their provenance.
    fn update_stop_coordinates(
        &self,
        stop_id: StopId,
        coordinates: Coordinates,
        provider: &str,
        geocoded_at: i64,
    ) -> RepoResult<()>;
    /// Rewrites one stop's position in its route.
    fn update_stop_order(&self, stop_id: StopId, sort_order: i64) -> RepoResult<()>;
    fn create_stop(&self, stop: &Stop) -> RepoResult<StopId>;
    fn get_stop(&self, stop_id: StopId) -> RepoResult<Option<Stop>>;
    /// Sets visit status; `completed_at` must be `None` for `Pending`.
    fn set_stop_status(
        &self,
        stop_id: StopId,
        status: StopStatus,
        completed_at: Option<i64>,
    ) -> RepoResult<()>;
    fn delete_stop(&self, stop_id: StopId) -> RepoResult<()>;
    /// Highest `sort_order` in a route, or `None` for an empty route.
    fn max_sort_order(&self, route_id: RouteId) -> RepoResult<Option<i64>>;
}

impl<T: StopStore + ?Sized> StopStore for &T {
    fn list_stops(&self, route_id: RouteId) -> RepoResult<Vec<Stop>> {
        (**self).list_stops(route_id)
    }

    fn update_stop_coordinates(
        &self,
        stop_id: StopId,
        coordinates: Coordinates,
        provider: &str,
        geocoded_at: i64,
    ) -> RepoResult<()> {
        (**self).update_stop_coordinates(stop_id, coordinates, provider, geocoded_at)
    }

    fn update_stop_order(&self, stop_id: StopId, sort_order: i64) -> RepoResult<()> {
        (**self).update_stop_order(stop_id, sort_order)
    }

    fn create_stop(&self, stop: &Stop) -> RepoResult<StopId> {
        (**self).create_stop(stop)
    }

    fn get_stop(&self, stop_id: StopId) -> RepoResult<Option<Stop>> {
        (**self).get_stop(stop_id)
    }

    fn set_stop_status(
        &self,
        stop_id: StopId,
        status: StopStatus,
        completed_at: Option<i64>,
    ) -> RepoResult<()> {
        (**self).set_stop_status(stop_id, status, completed_at)
    }

    fn delete_stop(&self, stop_id: StopId) -> RepoResult<()> {
        (**self).delete_stop(stop_id)
    }

    fn max_sort_order(&self, route_id: RouteId) -> RepoResult<Option<i64>> {
        (**self).max_sort_order(route_id)
    }
}

/// SQLite-backed stop store.
pub struct SqliteStopRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStopRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StopStore for SqliteStopRepository<'_> {
    fn list_stops(&self, route_id: RouteId) -> RepoResult<Vec<Stop>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STOP_SELECT_SQL}
             WHERE route_uuid = ?1
             ORDER BY sort_order ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([route_id.to_string()])?;
        let mut stops = Vec::new();
        while let Some(row) = rows.next()? {
            stops.push(parse_stop_row(row)?);
        }
        Ok(stops)
    }

    fn update_stop_coordinates(
        &self,
        stop_id: StopId,
        coordinates: Coordinates,
        provider: &str,
        geocoded_at: i64,
    ) -> RepoResult<()> {
        if !coordinates.is_valid() {
            return Err(StopValidationError::CoordinatesOutOfRange(coordinates).into());
        }

        let changed = self.conn.execute(
            "UPDATE stops
             SET
                lat = ?2,
                lng = ?3,
                geocode_provider = ?4,
                geocoded_at = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                stop_id.to_string(),
                coordinates.latitude,
                coordinates.longitude,
                provider,
                geocoded_at,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(stop_id));
        }
        Ok(())
    }

    fn update_stop_order(&self, stop_id: StopId, sort_order: i64) -> RepoResult<()> {
        if sort_order < 0 {
            return Err(StopValidationError::NegativeSortOrder(sort_order).into());
        }

        let changed = self.conn.execute(
            "UPDATE stops
             SET
                sort_order = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![stop_id.to_string(), sort_order],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(stop_id));
        }
        Ok(())
    }

    fn create_stop(&self, stop: &Stop) -> RepoResult<StopId> {
        stop.validate()?;

        self.conn.execute(
            "INSERT INTO stops (
                uuid,
                route_uuid,
                sort_order,
                address,
                phone,
                email,
                notes,
                status,
                completed_at,
                lat,
                lng,
                geocode_provider,
                geocoded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                stop.uuid.to_string(),
                stop.route_uuid.to_string(),
                stop.sort_order,
                stop.address.as_str(),
                stop.phone.as_deref(),
                stop.email.as_deref(),
                stop.notes.as_deref(),
                stop.status.as_str(),
                stop.completed_at,
                stop.coordinates.map(|c| c.latitude),
                stop.coordinates.map(|c| c.longitude),
                stop.geocode_provider.as_deref(),
                stop.geocoded_at,
            ],
        )?;

        Ok(stop.uuid)
    }

    fn get_stop(&self, stop_id: StopId) -> RepoResult<Option<Stop>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STOP_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([stop_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_stop_row(row)?));
        }
        Ok(None)
    }

    fn set_stop_status(
        &self,
        stop_id: StopId,
        status: StopStatus,
        completed_at: Option<i64>,
    ) -> RepoResult<()> {
        if status == StopStatus::Pending && completed_at.is_some() {
            return Err(StopValidationError::CompletedAtOnPendingStop.into());
        }

        let changed = self.conn.execute(
            "UPDATE stops
             SET
                status = ?2,
                completed_at = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![stop_id.to_string(), status.as_str(), completed_at],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(stop_id));
        }
        Ok(())
    }

    fn delete_stop(&self, stop_id: StopId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM stops WHERE uuid = ?1;", [stop_id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(stop_id));
        }
        Ok(())
    }

    fn max_sort_order(&self, route_id: RouteId) -> RepoResult<Option<i64>> {
        let max = self.conn.query_row(
            "SELECT MAX(sort_order) FROM stops WHERE route_uuid = ?1;",
            [route_id.to_string()],
            |row| row.get::<_, Option<i64>>(0),
        )?;
        Ok(max)
    }
}

fn parse_stop_row(row: &Row<'_>) -> RepoResult<Stop> {
    let uuid = parse_uuid(row.get::<_, String>("uuid")?, "stops.uuid")?;
    let route_uuid = parse_uuid(row.get::<_, String>("route_uuid")?, "stops.route_uuid")?;

    let status_text: String = row.get("status")?;
    let status = StopStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid stop status `{status_text}` in stops.status"))
    })?;

    let coordinates = match (
        row.get::<_, Option<f64>>("lat")?,
        row.get::<_, Option<f64>>("lng")?,
    ) {
        (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
        (None, None) => None,
        _ => {
            return Err(RepoError::InvalidData(format!(
                "stop {uuid} has only one of stops.lat/stops.lng set"
            )));
        }
    };

    let stop = Stop {
        uuid,
        route_uuid,
        address: row.get("address")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        notes: row.get("notes")?,
        coordinates,
        geocode_provider: row.get("geocode_provider")?,
        geocoded_at: row.get("geocoded_at")?,
        sort_order: row.get("sort_order")?,
        status,
        completed_at: row.get("completed_at")?,
    };
    stop.validate()?;
    Ok(stop)
}

pub(crate) fn parse_uuid(value: String, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(&value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
