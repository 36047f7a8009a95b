//! Keep `<out_dir>/<name>.sql` in sync with the rendered job statements.

use crate::generate::RenderedStatement;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Write,
    DryRun,
    Check,
}

/// How a statement's file on disk compares with its freshly rendered SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Missing,
    Stale,
    Current,
}

impl FileState {
    fn label(self) -> &'static str {
        match self {
            Self::Missing => "new",
            Self::Stale => "stale",
            Self::Current => "current",
        }
    }
}

/// A statement's target file and what it should contain.
#[derive(Debug, Clone)]
pub struct SqlFile {
    pub statement: String,
    pub path: PathBuf,
    pub content: String,
    pub state: FileState,
}

/// Statement names touched (or that would be touched) by a sync.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub pending: Vec<String>,
    pub written: Vec<String>,
}

/// File body for one statement: a provenance comment and the SQL.
pub fn sql_file_content(r: &RenderedStatement) -> String {
    format!(
        "-- {}: {} rows for MDS {}\n{}\n",
        r.name, r.entity, r.version, r.sql
    )
}

/// Pair every statement with its file and compare against what is on disk.
pub fn plan_sql_files(out_dir: &Path, statements: &[RenderedStatement]) -> Vec<SqlFile> {
    statements
        .iter()
        .map(|r| {
            let path = out_dir.join(format!("{}.sql", r.name));
            let content = sql_file_content(r);
            let state = match std::fs::read_to_string(&path) {
                Err(_) => FileState::Missing,
                Ok(existing) if existing == content => FileState::Current,
                Ok(_) => FileState::Stale,
            };
            SqlFile {
                statement: r.name.clone(),
                path,
                content,
                state,
            }
        })
        .collect()
}

pub fn sync_sql_files(files: &[SqlFile], mode: SyncMode) -> anyhow::Result<SyncReport> {
    let pending: Vec<&SqlFile> = files
        .iter()
        .filter(|f| f.state != FileState::Current)
        .collect();

    let mut report = SyncReport {
        pending: pending.iter().map(|f| f.statement.clone()).collect(),
        written: Vec::new(),
    };

    match mode {
        SyncMode::DryRun => {
            for f in &pending {
                println!(
                    "would write {} -> {} ({})",
                    f.statement,
                    f.path.display(),
                    f.state.label()
                );
            }
        }
        SyncMode::Check => {
            if !pending.is_empty() {
                for f in &pending {
                    eprintln!(
                        "[ERROR] {}: {} is {}",
                        f.statement,
                        f.path.display(),
                        f.state.label()
                    );
                }
                anyhow::bail!("{} statement file(s) out of date", pending.len());
            }
        }
        SyncMode::Write => {
            for f in &pending {
                if let Some(dir) = f.path.parent() {
                    std::fs::create_dir_all(dir).map_err(|e| {
                        anyhow::anyhow!("failed to create directory {}: {e}", dir.display())
                    })?;
                }
                std::fs::write(&f.path, &f.content).map_err(|e| {
                    anyhow::anyhow!("{}: failed to write {}: {e}", f.statement, f.path.display())
                })?;
                println!("wrote {} -> {}", f.statement, f.path.display());
                report.written.push(f.statement.clone());
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mds_sql::{EntityKind, Version};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mds-sql-out-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn rendered(name: &str, sql: &str) -> RenderedStatement {
        RenderedStatement {
            name: name.to_string(),
            entity: EntityKind::Trip,
            version: Version::new(0, 3, 0),
            sql: sql.to_string(),
        }
    }

    #[test]
    fn content_carries_statement_header() {
        let body = sql_file_content(&rendered("load_trips", "INSERT ... ;"));
        assert_eq!(body, "-- load_trips: trip rows for MDS 0.3.0\nINSERT ... ;\n");
    }

    #[test]
    fn write_then_check_tracks_statement_names() {
        let dir = scratch_dir("sync");
        let statements = vec![rendered("load_trips", "A ;"), rendered("load_sc", "B ;")];

        let plan = plan_sql_files(&dir, &statements);
        assert!(plan.iter().all(|f| f.state == FileState::Missing));
        assert!(sync_sql_files(&plan, SyncMode::Check).is_err());

        let report = sync_sql_files(&plan, SyncMode::Write).unwrap();
        assert_eq!(report.written, vec!["load_trips", "load_sc"]);

        let replanned = plan_sql_files(&dir, &statements);
        assert!(replanned.iter().all(|f| f.state == FileState::Current));
        assert!(sync_sql_files(&replanned, SyncMode::Check).unwrap().pending.is_empty());

        let changed = vec![rendered("load_trips", "A2 ;"), rendered("load_sc", "B ;")];
        let plan = plan_sql_files(&dir, &changed);
        assert_eq!(plan[0].state, FileState::Stale);
        assert_eq!(plan[1].state, FileState::Current);
        let report = sync_sql_files(&plan, SyncMode::Write).unwrap();
        assert_eq!(report.written, vec!["load_trips"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let dir = scratch_dir("dry");
        let plan = plan_sql_files(&dir, &[rendered("x", "X ;")]);
        let report = sync_sql_files(&plan, SyncMode::DryRun).unwrap();
        assert_eq!(report.pending, vec!["x"]);
        assert!(report.written.is_empty());
        assert!(!dir.join("x.sql").exists());
    }
}
