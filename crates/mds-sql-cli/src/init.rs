use crate::cli::GenInitArgs;
use std::path::Path;

pub fn run(args: GenInitArgs) -> anyhow::Result<()> {
    write_template(&args.config)
}

const TEMPLATE: &str = r#"
version = "1"

# Default MDS version for statements without their own `version`.
mds_version = "0.3.0"

# Write one <name>.sql per statement. Remove to print to stdout instead.
out_dir = "sql"

[[statements]]
name = "load_status_changes"
entity = "status_change"
source = "${MDS_STAGE_PREFIX}status_changes"

[[statements]]
name = "load_trips"
entity = "trip"
source = "${MDS_STAGE_PREFIX}trips"
# dest = "trips"
# version = "0.2.1"

[statements.on_conflict]
condition = "(provider_id, trip_id)"
# A raw string, a list of assignments, or a table of column = value.
actions = { route = "EXCLUDED.route", accuracy = "EXCLUDED.accuracy" }
"#;

fn write_template(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("refusing to overwrite existing file: {}", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("failed to create directory {}: {e}", parent.display())
            })?;
        }
    }

    std::fs::write(path, TEMPLATE.trim_start_matches('\n'))
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;

    println!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;

    #[test]
    fn template_parses() {
        // SAFETY: no other test in this crate reads MDS_STAGE_PREFIX.
        unsafe { std::env::set_var("MDS_STAGE_PREFIX", "stage_") };
        let file = ConfigFile::parse(TEMPLATE).unwrap();
        assert_eq!(file.statements.len(), 2);
        assert_eq!(file.statements[1].source, "stage_trips");
        assert!(file.statements[1].on_conflict.is_some());
    }
}
