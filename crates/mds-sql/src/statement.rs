//! `INSERT ... SELECT ... FROM` statements that move staged rows into the MDS tables.
//!
//! The generated statement is a single line:
//!
//! ```text
//! INSERT INTO "<dest>" (<cols>) SELECT <exprs> FROM "<source>" <on_conflict> ;
//! ```
//!
//! Generation is a pure function of its inputs: the same arguments always give
//! byte-identical SQL.
//!
//! # Example
//! ```
//! use mds_sql::{ConflictDirective, EntityKind, StatementBuilder};
//!
//! let sql = StatementBuilder::new(EntityKind::Trip, "stage_trips")
//!     .version("0.4.0")
//!     .on_conflict(ConflictDirective::update("(provider_id, trip_id)").set_excluded("route"))
//!     .build()?;
//! assert!(sql.starts_with(r#"INSERT INTO "trips" (provider_id,"#));
//! assert!(sql.ends_with("DO UPDATE SET route = EXCLUDED.route ;"));
//! # Ok::<(), mds_sql::SqlGenError>(())
//! ```

use crate::conflict::{ConflictDirective, on_conflict_clause};
use crate::error::{SqlGenError, SqlGenResult};
use crate::schema::{self, Column, EntityKind};
use crate::version::{IntoVersion, Version};
use serde::{Deserialize, Serialize};

/// Optional knobs for an insert-select statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertSelectOptions {
    /// Destination table; the entity's canonical table when `None`.
    #[serde(alias = "dest")]
    pub dest_table: Option<String>,
    /// Upsert instructions; `ON CONFLICT DO NOTHING` when `None`.
    pub on_conflict: Option<ConflictDirective>,
    /// Target MDS version; [`Version::mds_lower`] when `None`.
    pub version: Option<Version>,
}

impl InsertSelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dest_table(mut self, table: impl Into<String>) -> Self {
        self.dest_table = Some(table.into());
        self
    }

    pub fn on_conflict(mut self, directive: ConflictDirective) -> Self {
        self.on_conflict = Some(directive);
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// The version the statement will target.
    pub fn resolved_version(&self) -> Version {
        self.version.unwrap_or_else(Version::mds_lower)
    }
}

/// Builder for one insert-select statement.
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    entity: EntityKind,
    source: String,
    options: InsertSelectOptions,
    /// A version argument that failed to parse; reported by `build()`.
    version_error: Option<SqlGenError>,
}

impl StatementBuilder {
    /// Create a builder reading from the staging table `source`.
    pub fn new(entity: EntityKind, source: impl Into<String>) -> Self {
        Self {
            entity,
            source: source.into(),
            options: InsertSelectOptions::default(),
            version_error: None,
        }
    }

    /// Create a builder from a prepared options value.
    pub fn with_options(
        entity: EntityKind,
        source: impl Into<String>,
        options: InsertSelectOptions,
    ) -> Self {
        Self {
            options,
            ..Self::new(entity, source)
        }
    }

    /// Insert into `table` instead of the entity's canonical table.
    pub fn dest(mut self, table: impl Into<String>) -> Self {
        self.options.dest_table = Some(table.into());
        self
    }

    /// Upsert on conflict instead of skipping.
    pub fn on_conflict(mut self, directive: ConflictDirective) -> Self {
        self.options.on_conflict = Some(directive);
        self
    }

    /// Target a specific MDS version (a [`Version`] or its string form).
    pub fn version(mut self, version: impl IntoVersion) -> Self {
        match version.into_version() {
            Ok(v) => {
                self.options.version = Some(v);
                self.version_error = None;
            }
            Err(e) => self.version_error = Some(e),
        }
        self
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn options(&self) -> &InsertSelectOptions {
        &self.options
    }

    /// The resolved destination table.
    pub fn dest_table(&self) -> &str {
        self.options
            .dest_table
            .as_deref()
            .unwrap_or_else(|| self.entity.table())
    }

    /// The checked target version.
    pub fn target_version(&self) -> SqlGenResult<Version> {
        if let Some(err) = &self.version_error {
            return Err(err.clone());
        }
        let version = self.options.resolved_version();
        if version.is_unsupported() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                target: "mds_sql.statement",
                entity = %self.entity,
                %version,
                "rejecting unsupported MDS version"
            );
            return Err(SqlGenError::UnsupportedVersion(version));
        }
        Ok(version)
    }

    /// Columns the statement will insert, paired with their select expressions.
    pub fn columns(&self) -> SqlGenResult<Vec<Column>> {
        Ok(schema::columns(self.entity, self.target_version()?))
    }

    /// Render the statement.
    pub fn build(&self) -> SqlGenResult<String> {
        let version = self.target_version()?;
        let on_conflict = on_conflict_clause(self.options.on_conflict.as_ref());
        let columns = schema::columns(self.entity, version);
        let dest = self.dest_table();

        let mut sql = String::with_capacity(
            64 + dest.len()
                + self.source.len()
                + on_conflict.len()
                + columns
                    .iter()
                    .map(|c| c.name.len() + c.select.len() + 2)
                    .sum::<usize>(),
        );

        sql.push_str("INSERT INTO ");
        push_table(&mut sql, dest);
        sql.push_str(" (");
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                sql.push(',');
            }
            sql.push_str(col.name);
        }
        sql.push_str(") SELECT ");
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                sql.push(',');
            }
            sql.push_str(&col.select);
        }
        sql.push_str(" FROM ");
        push_table(&mut sql, &self.source);
        sql.push(' ');
        sql.push_str(&on_conflict);
        sql.push_str(" ;");

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "mds_sql.statement",
            entity = %self.entity,
            source = %self.source,
            dest = %dest,
            %version,
            column_count = columns.len(),
            upsert = self.options.on_conflict.is_some(),
            "generated insert-select statement"
        );

        Ok(sql)
    }
}

/// Table names go into the statement verbatim between double quotes.
fn push_table(sql: &mut String, name: &str) {
    sql.push('"');
    sql.push_str(name);
    sql.push('"');
}

/// Generate an insert-select statement for `entity`.
pub fn insert_select(
    entity: EntityKind,
    source: &str,
    options: &InsertSelectOptions,
) -> SqlGenResult<String> {
    StatementBuilder::with_options(entity, source, options.clone()).build()
}

/// Generate an insert-select statement into `status_changes` (or `options.dest_table`).
pub fn insert_status_changes_from(
    source: &str,
    options: &InsertSelectOptions,
) -> SqlGenResult<String> {
    insert_select(EntityKind::StatusChange, source, options)
}

/// Generate an insert-select statement into `trips` (or `options.dest_table`).
pub fn insert_trips_from(source: &str, options: &InsertSelectOptions) -> SqlGenResult<String> {
    insert_select(EntityKind::Trip, source, options)
}

#[cfg(test)]
mod tests;
