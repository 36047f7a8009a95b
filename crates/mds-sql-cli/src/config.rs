use mds_sql::{ConflictDirective, EntityKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: PathBuf,
    pub config_dir: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let config_dir = config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!(
                "invalid config file {}: {e:#}",
                config_path.display()
            )
        })?;

        Ok(Self {
            config_path,
            config_dir,
            file,
        })
    }

    pub fn resolve_path(&self, p: impl AsRef<Path>) -> PathBuf {
        let p = p.as_ref();
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.config_dir.join(p)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,

    /// Default MDS version for statements that don't set one.
    pub mds_version: Option<String>,

    /// Write one `<name>.sql` per statement here instead of printing.
    pub out_dir: Option<String>,

    #[serde(default)]
    pub statements: Vec<StatementConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatementConfig {
    pub name: String,
    pub entity: EntityKind,
    pub source: String,
    pub dest: Option<String>,
    pub version: Option<String>,
    pub on_conflict: Option<ConflictDirective>,
}

impl ConfigFile {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile =
            toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse: {e}"))?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        if let Some(v) = self.mds_version.as_mut() {
            *v = expand_env_vars(v)?;
        }
        if let Some(dir) = self.out_dir.as_mut() {
            *dir = expand_env_vars(dir)?;
        }

        for s in &mut self.statements {
            s.name = expand_env_vars(&s.name)?;
            s.source = expand_env_vars(&s.source)?;
            if let Some(dest) = s.dest.as_mut() {
                *dest = expand_env_vars(dest)?;
            }
            if let Some(v) = s.version.as_mut() {
                *v = expand_env_vars(v)?;
            }
        }

        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }

        if self.statements.is_empty() {
            anyhow::bail!("at least one [[statements]] entry is required");
        }

        let mut seen = std::collections::HashSet::<&str>::new();
        for s in &self.statements {
            if s.name.trim().is_empty() {
                anyhow::bail!("statements.name must not be empty");
            }
            if !s
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            {
                anyhow::bail!(
                    "statements.name may only contain letters, digits, '_', '-' and '.': {}",
                    s.name
                );
            }
            if !seen.insert(s.name.as_str()) {
                anyhow::bail!("duplicate statements.name: {}", s.name);
            }
            if s.source.trim().is_empty() {
                anyhow::bail!("statements.source must not be empty (statement: {})", s.name);
            }
            if s.dest.as_deref().is_some_and(|d| d.trim().is_empty()) {
                anyhow::bail!("statements.dest must not be empty (statement: {})", s.name);
            }
        }

        Ok(())
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}}}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
