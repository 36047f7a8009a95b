//! # mds-sql
//!
//! SQL generation for loading MDS provider data out of staging tables.
//!
//! Providers' `status_changes` and `trips` payloads are first copied as-is into
//! a staging table; the statements built here then cast and convert those rows
//! into the canonical tables, adapting to the MDS version the payload follows.
//!
//! ## Features
//!
//! - **Version aware**: pre-0.3.0 payloads use Unix seconds and `associated_trips`,
//!   0.3.0 and later use milliseconds, `associated_trip` and `publication_time`
//! - **Upserts**: `ON CONFLICT DO NOTHING` by default, or `DO UPDATE SET ...`
//!   from a raw fragment, a list of assignments, or a column map
//! - **Deterministic**: identical inputs render byte-identical SQL
//! - **No I/O**: statements are plain strings for whatever client runs them
//!
//! ```
//! use mds_sql::{EntityKind, StatementBuilder};
//!
//! let sql = StatementBuilder::new(EntityKind::StatusChange, "stage_status_changes")
//!     .version("0.3.0")
//!     .build()?;
//! assert!(sql.contains("associated_trip"));
//! assert!(sql.ends_with("ON CONFLICT DO NOTHING ;"));
//! # Ok::<(), mds_sql::SqlGenError>(())
//! ```

pub mod conflict;
pub mod error;
pub mod schema;
pub mod statement;
pub mod version;

pub use conflict::{ConflictActions, ConflictDirective, on_conflict_clause};
pub use error::{SqlGenError, SqlGenResult};
pub use schema::{Column, EntityKind, STATUS_CHANGES, TRIPS, columns};
pub use statement::{
    InsertSelectOptions, StatementBuilder, insert_select, insert_status_changes_from,
    insert_trips_from,
};
pub use version::{IntoVersion, Version};
