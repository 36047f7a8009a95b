use crate::cli::RenderArgs;
use mds_sql::{ConflictDirective, StatementBuilder, Version};

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    println!("{}", render(&args)?);
    Ok(())
}

pub fn render(args: &RenderArgs) -> anyhow::Result<String> {
    let mut builder = StatementBuilder::new(args.entity, args.source.as_str());
    if let Some(dest) = &args.dest {
        builder = builder.dest(dest.as_str());
    }
    if let Some(version) = &args.version {
        builder = builder.version(version.as_str());
    }
    if let Some(condition) = &args.on_conflict {
        // Keep the command-line order of assignments.
        let assignments = args.set.iter().map(|(column, value)| format!("{column} = {value}"));
        builder = builder.on_conflict(ConflictDirective::columns(condition.as_str(), assignments));
    }

    Ok(builder.build()?)
}

/// `mds-sql versions`
pub fn run_versions() -> anyhow::Result<()> {
    for line in version_lines() {
        println!("{line}");
    }
    Ok(())
}

/// One line per known release, the default one marked.
pub fn version_lines() -> Vec<String> {
    let lower = Version::mds_lower();
    Version::mds()
        .iter()
        .map(|v| {
            let unit = if v.uses_unix_seconds() {
                "seconds"
            } else {
                "milliseconds"
            };
            let marker = if *v == lower { "  (default)" } else { "" };
            format!("{v}  timestamps: {unit}{marker}")
        })
        .collect()
}
