use mds_sql::EntityKind;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Render,
    Gen,
    GenInit,
    Versions,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Render(RenderArgs),
    Gen(GenCommand),
    Versions,
}

#[derive(Debug, Clone)]
pub enum GenCommand {
    Run(GenRunArgs),
    Init(GenInitArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Sql,
    Json,
}

#[derive(Debug, Clone)]
pub struct RenderArgs {
    pub entity: EntityKind,
    pub source: String,
    pub dest: Option<String>,
    pub version: Option<String>,
    pub on_conflict: Option<String>,
    pub set: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct GenRunArgs {
    pub config: PathBuf,
    pub dry_run: bool,
    pub check: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Clone)]
pub struct GenInitArgs {
    pub config: PathBuf,
}

const DEFAULT_CONFIG: &str = "mds-sql.toml";

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "render" => parse_render(it.map(|s| s.as_str())),
        "gen" => parse_gen(it.map(|s| s.as_str())),
        "versions" => parse_versions(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Read the value of `--flag <v>` or `--flag=<v>`.
fn flag_value<'a>(
    flag: &str,
    token: &'a str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<&'a str>> {
    if token == flag {
        let Some(v) = it.next() else {
            anyhow::bail!("{flag} requires a value");
        };
        return Ok(Some(v));
    }
    Ok(token
        .strip_prefix(flag)
        .and_then(|rest| rest.strip_prefix('=')))
}

fn parse_render<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut entity: Option<EntityKind> = None;
    let mut source: Option<String> = None;
    let mut dest: Option<String> = None;
    let mut version: Option<String> = None;
    let mut on_conflict: Option<String> = None;
    let mut set: Vec<(String, String)> = Vec::new();

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Render));
        }
        if let Some(v) = flag_value("--entity", token, &mut it)? {
            entity = Some(v.parse::<EntityKind>().map_err(|e| anyhow::anyhow!(e))?);
        } else if let Some(v) = flag_value("--source", token, &mut it)? {
            source = Some(v.to_string());
        } else if let Some(v) = flag_value("--dest", token, &mut it)? {
            dest = Some(v.to_string());
        } else if let Some(v) = flag_value("--version", token, &mut it)? {
            version = Some(v.to_string());
        } else if let Some(v) = flag_value("--on-conflict", token, &mut it)? {
            on_conflict = Some(v.to_string());
        } else if let Some(v) = flag_value("--set", token, &mut it)? {
            let Some((column, value)) = v.split_once('=') else {
                anyhow::bail!("--set expects <column>=<value>, got: {v}");
            };
            let column = column.trim();
            if column.is_empty() {
                anyhow::bail!("--set column must not be empty");
            }
            set.push((column.to_string(), value.trim().to_string()));
        } else if let Some(v) = flag_value("--set-excluded", token, &mut it)? {
            for column in split_csv(v) {
                let value = format!("EXCLUDED.{column}");
                set.push((column, value));
            }
        } else {
            anyhow::bail!("unknown argument: {token}");
        }
    }

    let Some(entity) = entity else {
        anyhow::bail!("missing --entity (status_change | trip)");
    };
    let Some(source) = source.filter(|s| !s.trim().is_empty()) else {
        anyhow::bail!("missing --source <TABLE>");
    };
    match (&on_conflict, set.is_empty()) {
        (Some(_), true) => anyhow::bail!("--on-conflict requires at least one --set or --set-excluded"),
        (None, false) => anyhow::bail!("--set requires --on-conflict <CONDITION>"),
        _ => {}
    }

    Ok(Command::Render(RenderArgs {
        entity,
        source,
        dest,
        version,
        on_conflict,
        set,
    }))
}

fn parse_gen<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut subcmd: Option<&str> = None;

    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut dry_run = false;
    let mut check = false;
    let mut format = OutputFormat::Sql;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => {
                return Ok(Command::Help(match subcmd {
                    None => HelpTopic::Gen,
                    Some("init") => HelpTopic::GenInit,
                    Some(other) => anyhow::bail!("unknown subcommand: {other}"),
                }));
            }
            "init" if subcmd.is_none() => {
                subcmd = Some(token);
            }
            "--dry-run" => dry_run = true,
            "--check" => check = true,
            _ => {
                if let Some(v) = flag_value("--config", token, &mut it)? {
                    config = PathBuf::from(v);
                } else if let Some(v) = flag_value("--format", token, &mut it)? {
                    format = match v {
                        "sql" => OutputFormat::Sql,
                        "json" => OutputFormat::Json,
                        other => anyhow::bail!("invalid --format value: {other} (sql | json)"),
                    };
                } else {
                    anyhow::bail!("unknown argument: {token}");
                }
            }
        }
    }

    if dry_run && check {
        anyhow::bail!("`gen` accepts either --dry-run or --check, not both");
    }

    let cmd = match subcmd {
        None => GenCommand::Run(GenRunArgs {
            config,
            dry_run,
            check,
            format,
        }),
        Some("init") => {
            if dry_run || check || format != OutputFormat::Sql {
                anyhow::bail!("invalid options for `gen init`");
            }
            GenCommand::Init(GenInitArgs { config })
        }
        Some(other) => anyhow::bail!("unknown subcommand: {other}"),
    };

    Ok(Command::Gen(cmd))
}

fn parse_versions<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    match it.next() {
        None => Ok(Command::Versions),
        Some("-h" | "--help") => Ok(Command::Help(HelpTopic::Versions)),
        Some(other) => anyhow::bail!("unknown argument: {other}"),
    }
}

fn split_csv(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
mds-sql - render MDS staging-table migration SQL

USAGE:
  mds-sql <COMMAND> [OPTIONS]

COMMANDS:
  render        Print one INSERT ... SELECT statement
  gen           Render every statement in a job file
  versions      List known MDS releases

Run `mds-sql <command> --help` for more."
            );
        }
        HelpTopic::Render => {
            println!(
                "\
USAGE:
  mds-sql render --entity <KIND> --source <TABLE> [OPTIONS]

OPTIONS:
  --entity <KIND>             status_change | trip
  --source <TABLE>            Staging table to select from
  --dest <TABLE>              Destination table (default: status_changes / trips)
  --version <VERSION>         Target MDS version (default: lowest supported)
  --on-conflict <CONDITION>   Upsert target, e.g. \"(provider_id, trip_id)\"
  --set <COL>=<VALUE>         Upsert assignment (repeatable)
  --set-excluded <CSV>        Upsert columns from EXCLUDED
  -h, --help                  Print help"
            );
        }
        HelpTopic::Gen => {
            println!(
                "\
USAGE:
  mds-sql gen [OPTIONS]
  mds-sql gen init [OPTIONS]

OPTIONS:
  --config <FILE>       Job file path (default: mds-sql.toml)
  --format <FORMAT>     sql | json (default: sql)
  --dry-run             Print files that would change (requires out_dir)
  --check               Exit non-zero if output would change (requires out_dir)
  -h, --help            Print help"
            );
        }
        HelpTopic::GenInit => {
            println!(
                "\
USAGE:
  mds-sql gen init [OPTIONS]

OPTIONS:
  --config <FILE>       Output job file path (default: mds-sql.toml)
  -h, --help            Print help"
            );
        }
        HelpTopic::Versions => {
            println!(
                "\
USAGE:
  mds-sql versions

Lists known MDS releases and the timestamp unit each one uses."
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("mds-sql")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parse_render_upsert() {
        let cmd = parse_args(&args(&[
            "render",
            "--entity",
            "trips",
            "--source=stage_trips",
            "--version",
            "0.3.0",
            "--on-conflict",
            "(provider_id, trip_id)",
            "--set",
            "accuracy=EXCLUDED.accuracy",
            "--set-excluded",
            "route, end_time",
        ]))
        .unwrap();
        let Command::Render(r) = cmd else {
            panic!("expected render");
        };

        assert_eq!(r.entity, EntityKind::Trip);
        assert_eq!(r.source, "stage_trips");
        assert_eq!(r.version.as_deref(), Some("0.3.0"));
        assert_eq!(
            r.set,
            vec![
                ("accuracy".to_string(), "EXCLUDED.accuracy".to_string()),
                ("route".to_string(), "EXCLUDED.route".to_string()),
                ("end_time".to_string(), "EXCLUDED.end_time".to_string()),
            ]
        );
    }

    #[test]
    fn parse_render_requires_entity_and_source() {
        assert!(parse_args(&args(&["render", "--source", "s"])).is_err());
        assert!(parse_args(&args(&["render", "--entity", "trip"])).is_err());
        assert!(parse_args(&args(&["render", "--entity", "vehicle", "--source", "s"])).is_err());
    }

    #[test]
    fn parse_render_set_needs_condition() {
        let err = parse_args(&args(&[
            "render", "--entity", "trip", "--source", "s", "--set", "a=b",
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("--on-conflict"));
    }

    #[test]
    fn parse_gen_json() {
        let cmd = parse_args(&args(&["gen", "--config", "jobs/mds.toml", "--format=json"])).unwrap();
        let Command::Gen(GenCommand::Run(g)) = cmd else {
            panic!("expected gen");
        };
        assert_eq!(g.config, PathBuf::from("jobs/mds.toml"));
        assert_eq!(g.format, OutputFormat::Json);
        assert!(!g.dry_run);
    }

    #[test]
    fn parse_gen_rejects_dry_run_with_check() {
        assert!(parse_args(&args(&["gen", "--dry-run", "--check"])).is_err());
    }

    #[test]
    fn parse_gen_init_help() {
        let cmd = parse_args(&args(&["gen", "init", "--help"])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::GenInit)));
    }

    #[test]
    fn parse_versions() {
        assert!(matches!(parse_args(&args(&["versions"])).unwrap(), Command::Versions));
        assert!(parse_args(&args(&["versions", "extra"])).is_err());
    }
}
