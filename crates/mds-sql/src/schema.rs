//! MDS destination tables and their column catalogs.
//!
//! Every destination column is paired with the SELECT expression that reads it
//! from a staging table, so insert and select lists can never drift apart.
//! Staging tables hold raw provider payload values; the expressions cast them to
//! the destination's Postgres types (uuid, enum types, jsonb, arrays) and turn
//! Unix timestamps into `timestamp` values in UTC.

use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical name of the status changes table.
pub const STATUS_CHANGES: &str = "status_changes";

/// Canonical name of the trips table.
pub const TRIPS: &str = "trips";

/// The kind of record a statement moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[serde(alias = "status_changes")]
    StatusChange,
    #[serde(alias = "trips")]
    Trip,
}

impl EntityKind {
    /// Canonical destination table.
    pub fn table(self) -> &'static str {
        match self {
            Self::StatusChange => STATUS_CHANGES,
            Self::Trip => TRIPS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StatusChange => "status_change",
            Self::Trip => "trip",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "status_change" | "status_changes" => Ok(Self::StatusChange),
            "trip" | "trips" => Ok(Self::Trip),
            other => Err(format!("unknown entity kind: {other}")),
        }
    }
}

/// How a column is read out of the staging table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectExpr {
    /// A fixed SQL expression.
    Sql(&'static str),
    /// Integer Unix seconds.
    UnixSeconds,
    /// Integer Unix milliseconds.
    UnixMillis,
}

#[derive(Debug, Clone, Copy)]
struct ColumnDef {
    name: &'static str,
    select: SelectExpr,
}

impl ColumnDef {
    const fn sql(name: &'static str, expr: &'static str) -> Self {
        Self {
            name,
            select: SelectExpr::Sql(expr),
        }
    }

    const fn secs(name: &'static str) -> Self {
        Self {
            name,
            select: SelectExpr::UnixSeconds,
        }
    }

    const fn millis(name: &'static str) -> Self {
        Self {
            name,
            select: SelectExpr::UnixMillis,
        }
    }

    fn resolve(&self) -> Column {
        let select = match self.select {
            SelectExpr::Sql(expr) => expr.to_string(),
            SelectExpr::UnixSeconds => unix_seconds_to_utc(self.name),
            SelectExpr::UnixMillis => unix_millis_to_utc(self.name),
        };
        Column {
            name: self.name,
            select,
        }
    }
}

// Provider, device and vehicle identity shared by every table.
const COMMON_COLUMNS: &[ColumnDef] = &[
    ColumnDef::sql("provider_id", "cast(provider_id as uuid)"),
    ColumnDef::sql("provider_name", "provider_name"),
    ColumnDef::sql("device_id", "cast(device_id as uuid)"),
    ColumnDef::sql("vehicle_id", "vehicle_id"),
    ColumnDef::sql("vehicle_type", "cast(vehicle_type as vehicle_types)"),
    ColumnDef::sql("propulsion_type", "cast(propulsion_type as propulsion_types[])"),
];

const STATUS_CHANGE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::sql("event_type", "cast(event_type as event_types)"),
    ColumnDef::sql("event_type_reason", "cast(event_type_reason as event_type_reasons)"),
    ColumnDef::sql("event_location", "cast(event_location as jsonb)"),
    ColumnDef::sql("battery_pct", "battery_pct"),
];

const STATUS_CHANGE_COLUMNS_V0_2: &[ColumnDef] = &[
    ColumnDef::secs("event_time"),
    ColumnDef::sql("associated_trips", "cast(associated_trips as uuid[])"),
];

const STATUS_CHANGE_COLUMNS_V0_3: &[ColumnDef] = &[
    ColumnDef::millis("event_time"),
    ColumnDef::millis("publication_time"),
    ColumnDef::sql("associated_trip", "cast(associated_trip as uuid)"),
];

const TRIP_COLUMNS: &[ColumnDef] = &[
    ColumnDef::sql("trip_id", "cast(trip_id as uuid)"),
    ColumnDef::sql("trip_duration", "trip_duration"),
    ColumnDef::sql("trip_distance", "trip_distance"),
    ColumnDef::sql("route", "cast(route as jsonb)"),
    ColumnDef::sql("accuracy", "accuracy"),
    ColumnDef::sql("parking_verification_url", "parking_verification_url"),
    ColumnDef::sql("standard_cost", "standard_cost"),
    ColumnDef::sql("actual_cost", "actual_cost"),
];

const TRIP_COLUMNS_V0_2: &[ColumnDef] = &[ColumnDef::secs("start_time"), ColumnDef::secs("end_time")];

const TRIP_COLUMNS_V0_3: &[ColumnDef] = &[
    ColumnDef::millis("start_time"),
    ColumnDef::millis("end_time"),
    ColumnDef::millis("publication_time"),
];

/// A destination column and the expression that selects it from staging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub select: String,
}

/// Ordered columns for `entity` under the given MDS version.
///
/// The version is not range-checked here; callers that need that guarantee go
/// through [`crate::StatementBuilder`].
pub fn columns(entity: EntityKind, version: Version) -> Vec<Column> {
    let (fixed, timed) = match (entity, version.uses_unix_seconds()) {
        (EntityKind::StatusChange, true) => (STATUS_CHANGE_COLUMNS, STATUS_CHANGE_COLUMNS_V0_2),
        (EntityKind::StatusChange, false) => (STATUS_CHANGE_COLUMNS, STATUS_CHANGE_COLUMNS_V0_3),
        (EntityKind::Trip, true) => (TRIP_COLUMNS, TRIP_COLUMNS_V0_2),
        (EntityKind::Trip, false) => (TRIP_COLUMNS, TRIP_COLUMNS_V0_3),
    };

    COMMON_COLUMNS
        .iter()
        .chain(fixed)
        .chain(timed)
        .map(ColumnDef::resolve)
        .collect()
}

/// `to_timestamp(col) at time zone 'UTC'`
pub fn unix_seconds_to_utc(column: &str) -> String {
    format!("to_timestamp({column}) at time zone 'UTC'")
}

/// `to_timestamp(cast(col as double precision) / 1000.0) at time zone 'UTC'`
pub fn unix_millis_to_utc(column: &str) -> String {
    format!("to_timestamp(cast({column} as double precision) / 1000.0) at time zone 'UTC'")
}
