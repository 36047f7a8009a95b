use crate::cli::{GenRunArgs, OutputFormat};
use crate::config::{ProjectConfig, StatementConfig};
use crate::write::{SyncMode, plan_sql_files, sync_sql_files};
use mds_sql::{EntityKind, StatementBuilder, Version};
use serde::Serialize;

/// One rendered job-file statement.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedStatement {
    pub name: String,
    pub entity: EntityKind,
    pub version: Version,
    pub sql: String,
}

pub fn run(args: GenRunArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load(args.config)?;
    let config_path = project.config_path.display();

    let default_version = project
        .file
        .mds_version
        .as_deref()
        .map(Version::parse)
        .transpose()
        .map_err(|e| anyhow::anyhow!("mds_version in {config_path}: {e}"))?;

    let mut had_error = false;
    let mut rendered: Vec<RenderedStatement> = Vec::new();

    for stmt in &project.file.statements {
        if stmt.version.is_none() && default_version.is_none() {
            eprintln!(
                "[WARN] {}: no version set, targeting MDS {}",
                stmt.name,
                Version::mds_lower()
            );
        }
        match render_statement(stmt, default_version) {
            Ok(r) => rendered.push(r),
            Err(e) => {
                eprintln!("[ERROR] {}: {e}", stmt.name);
                had_error = true;
            }
        }
    }

    if had_error {
        anyhow::bail!("gen failed due to previous errors in {config_path}");
    }

    let mode = match (args.dry_run, args.check) {
        (_, true) => SyncMode::Check,
        (true, false) => SyncMode::DryRun,
        (false, false) => SyncMode::Write,
    };

    if args.format == OutputFormat::Json {
        if mode != SyncMode::Write {
            anyhow::bail!("--dry-run/--check cannot be combined with --format json");
        }
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        return Ok(());
    }

    let Some(out_dir) = project.file.out_dir.as_deref() else {
        if mode != SyncMode::Write {
            anyhow::bail!("--dry-run/--check need `out_dir` in {config_path}");
        }
        for r in &rendered {
            println!("-- {} ({} {})", r.name, r.entity, r.version);
            println!("{}", r.sql);
        }
        return Ok(());
    };

    let plan = plan_sql_files(&project.resolve_path(out_dir), &rendered);
    let report = sync_sql_files(&plan, mode)?;
    if mode == SyncMode::Write && report.written.is_empty() {
        println!("{} statement file(s) up to date", plan.len());
    }

    Ok(())
}

/// Render a job-file statement, falling back to the file-level default version.
pub fn render_statement(
    stmt: &StatementConfig,
    default_version: Option<Version>,
) -> mds_sql::SqlGenResult<RenderedStatement> {
    let mut builder = StatementBuilder::new(stmt.entity, stmt.source.as_str());
    if let Some(dest) = &stmt.dest {
        builder = builder.dest(dest.as_str());
    }
    if let Some(directive) = &stmt.on_conflict {
        builder = builder.on_conflict(directive.clone());
    }
    match (&stmt.version, default_version) {
        (Some(raw), _) => builder = builder.version(raw.as_str()),
        (None, Some(v)) => builder = builder.version(v),
        (None, None) => {}
    }

    let version = builder.target_version()?;
    let sql = builder.build()?;
    Ok(RenderedStatement {
        name: stmt.name.clone(),
        entity: stmt.entity,
        version,
        sql,
    })
}
