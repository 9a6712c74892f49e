//! `dynq.toml` loading and command-line overrides.
//!
//! ```toml
//! [database]
//! url = "${DATABASE_URL}"
//! max_connections = 16
//! recycling = "fast"  # or "verified"
//!
//! [output]
//! format = "table"   # or "json"
//! ```

use crate::output::OutputFormat;
use dynq::{PoolConfig, Recycling};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "dynq.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    #[serde(default)]
    pub recycling: Recycling,
}

fn default_max_connections() -> usize {
    PoolConfig::DEFAULT_MAX_SIZE
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            recycling: Recycling::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        Self::parse(&raw, |key| std::env::var(key).ok())
            .map_err(|e| anyhow::anyhow!("invalid config file {}: {e:#}", path.display()))
    }

    fn parse(raw: &str, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        if let Some(url) = file.database.url.as_mut() {
            *url = expand_env_vars(url, &env)?;
        }
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            anyhow::bail!("database.url must not be empty");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be greater than 0");
        }
        Ok(())
    }
}

/// Everything a command needs after config, environment and flags are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub pool: PoolConfig,
    pub format: OutputFormat,
}

/// Flag values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub database: Option<String>,
    pub format: Option<OutputFormat>,
}

impl Settings {
    /// Load `--config` (which must exist) or `./dynq.toml` (which may not).
    pub fn resolve(overrides: Overrides) -> anyhow::Result<Self> {
        let file = match &overrides.config {
            Some(path) => ConfigFile::load(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    ConfigFile::load(default)?
                } else {
                    ConfigFile::default()
                }
            }
        };
        Self::merge(file, overrides, std::env::var("DATABASE_URL").ok())
    }

    /// URL precedence: `--database`, then `database.url`, then `DATABASE_URL`.
    fn merge(
        file: ConfigFile,
        overrides: Overrides,
        env_url: Option<String>,
    ) -> anyhow::Result<Self> {
        let database_url = overrides
            .database
            .or(file.database.url)
            .or(env_url)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "no database URL: pass --database, set database.url in {DEFAULT_CONFIG_FILE}, or set DATABASE_URL"
                )
            })?;

        Ok(Self {
            database_url,
            pool: PoolConfig {
                max_size: file.database.max_connections,
                recycling: file.database.recycling,
            },
            format: overrides.format.unwrap_or(file.output.format),
        })
    }
}

/// Replace every `${NAME}` with the value `env` returns for `NAME`.
fn expand_env_vars(input: &str, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            anyhow::bail!("unterminated env var reference: ${{{after}");
        };
        let key = &after[..end];
        if key.is_empty() {
            anyhow::bail!("invalid env var reference: ${{}}");
        }
        let value =
            env(key).ok_or_else(|| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}
