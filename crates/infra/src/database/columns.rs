//! Column encoding shared by the SQLite repositories.
//!
//! Timestamps are stored as RFC 3339 TEXT in UTC with a fixed microsecond
//! width, so comparing the stored strings in SQL matches chronological
//! comparison. Uuids and enums are stored in their canonical string forms.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use convene_domain::{EventStatus, Role};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

/// Encode a timestamp for storage and for comparison parameters.
pub(crate) fn sql_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Encode a uuid for storage and lookups.
pub(crate) fn sql_uuid(id: Uuid) -> String {
    id.to_string()
}

pub(crate) fn column_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub(crate) fn column_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub(crate) fn column_status(row: &Row<'_>, idx: usize) -> rusqlite::Result<EventStatus> {
    let raw: String = row.get(idx)?;
    EventStatus::from_str(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into()))
}

pub(crate) fn column_role(row: &Row<'_>, idx: usize) -> rusqlite::Result<Role> {
    let raw: String = row.get(idx)?;
    Role::from_str(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into()))
}
