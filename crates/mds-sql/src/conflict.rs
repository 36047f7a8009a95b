//! `ON CONFLICT` clause rendering.
//!
//! Condition and action fragments are trusted SQL text supplied by the caller;
//! they are spliced into the statement as-is.
//!
//! # Example
//! ```
//! use mds_sql::{ConflictDirective, on_conflict_clause};
//!
//! let upsert = ConflictDirective::update("(provider_id, device_id, event_time)")
//!     .set_excluded("battery_pct");
//! assert_eq!(
//!     on_conflict_clause(Some(&upsert)),
//!     "ON CONFLICT (provider_id, device_id, event_time) DO UPDATE SET battery_pct = EXCLUDED.battery_pct"
//! );
//! assert_eq!(on_conflict_clause(None), "ON CONFLICT DO NOTHING");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The `SET` part of an `ON CONFLICT ... DO UPDATE`.
///
/// Deserializes untagged: a string, an array of strings, or a table of
/// column/value strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConflictActions {
    /// A complete SQL fragment, e.g. `"battery_pct = EXCLUDED.battery_pct"`.
    RawSql(String),
    /// Assignment fragments joined with commas.
    ColumnList(Vec<String>),
    /// `column = value` pairs, rendered in key order.
    ColumnMap(BTreeMap<String, String>),
}

impl ConflictActions {
    /// Render the assignment list.
    pub fn to_sql(&self) -> String {
        match self {
            Self::RawSql(sql) => sql.clone(),
            Self::ColumnList(items) => items.join(","),
            Self::ColumnMap(map) => map
                .iter()
                .map(|(column, value)| format!("{column} = {value}"))
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<&str> for ConflictActions {
    fn from(sql: &str) -> Self {
        Self::RawSql(sql.to_string())
    }
}

impl From<String> for ConflictActions {
    fn from(sql: String) -> Self {
        Self::RawSql(sql)
    }
}

impl From<Vec<String>> for ConflictActions {
    fn from(items: Vec<String>) -> Self {
        Self::ColumnList(items)
    }
}

impl From<BTreeMap<String, String>> for ConflictActions {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self::ColumnMap(map)
    }
}

/// Upsert instructions: `ON CONFLICT <condition> DO UPDATE SET <actions>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictDirective {
    /// Conflict target, e.g. `(provider_id, trip_id)` or `ON CONSTRAINT trips_pkey`.
    pub condition: String,
    pub actions: ConflictActions,
}

impl ConflictDirective {
    pub fn new(condition: impl Into<String>, actions: impl Into<ConflictActions>) -> Self {
        Self {
            condition: condition.into(),
            actions: actions.into(),
        }
    }

    /// Start a column map directive with no assignments yet.
    pub fn update(condition: impl Into<String>) -> Self {
        Self::new(condition, ConflictActions::ColumnMap(BTreeMap::new()))
    }

    /// A directive whose actions are one raw SQL fragment.
    pub fn raw(condition: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(condition, ConflictActions::RawSql(sql.into()))
    }

    /// A directive whose actions are a list of assignment fragments.
    pub fn columns<I, S>(condition: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            condition,
            ConflictActions::ColumnList(items.into_iter().map(Into::into).collect()),
        )
    }

    /// A directive whose actions are `column = value` pairs.
    pub fn map<I, K, V>(condition: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            condition,
            ConflictActions::ColumnMap(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        )
    }

    /// Add a `column = value` assignment.
    ///
    /// A raw fragment is kept as the first list item.
    pub fn set(mut self, column: &str, value: &str) -> Self {
        self.actions = match self.actions {
            ConflictActions::ColumnMap(mut map) => {
                map.insert(column.to_string(), value.to_string());
                ConflictActions::ColumnMap(map)
            }
            ConflictActions::ColumnList(mut items) => {
                items.push(format!("{column} = {value}"));
                ConflictActions::ColumnList(items)
            }
            ConflictActions::RawSql(sql) => {
                ConflictActions::ColumnList(vec![sql, format!("{column} = {value}")])
            }
        };
        self
    }

    /// Set column to EXCLUDED value.
    pub fn set_excluded(self, column: &str) -> Self {
        let value = format!("EXCLUDED.{column}");
        self.set(column, &value)
    }

    /// Render the full `ON CONFLICT ... DO UPDATE SET ...` clause.
    pub fn to_sql(&self) -> String {
        format!(
            "ON CONFLICT {} DO UPDATE SET {}",
            self.condition,
            self.actions.to_sql()
        )
    }
}

/// Render the conflict clause; `None` means `ON CONFLICT DO NOTHING`.
pub fn on_conflict_clause(directive: Option<&ConflictDirective>) -> String {
    match directive {
        Some(d) => d.to_sql(),
        None => "ON CONFLICT DO NOTHING".to_string(),
    }
}
