//! `permit` configuration file.
//!
//! Precedence: CLI flag, then `PERMIT_*` env var, then this file, then the
//! built-in default. The `[governance]` table is only read by `init`; after
//! that the state file is authoritative.

use anyhow::Context as _;
use permit_governance::GovernanceConfig;
use permit_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Where the bincode governance state lives.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Tracing filter, e.g. `"info"` or `"warn,permit_governance=debug"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub governance: GovernanceConfig,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("./permit-state.bin")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl CliConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.governance.validate()?;
        Ok(config)
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            governance: GovernanceConfig::default(),
        }
    }
}
