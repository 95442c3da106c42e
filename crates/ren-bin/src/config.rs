//! `ren.toml` configuration loading, grounded on `core-config`'s
//! discover/load_from split and its `#[serde(default = "...")]` pattern for
//! fields with a non-zero default.

use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct PoolConfig {
    #[serde(default = "PoolConfig::default_chunk_stubs")]
    pub chunk_stubs: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { chunk_stubs: Self::default_chunk_stubs() }
    }
}

impl PoolConfig {
    const fn default_chunk_stubs() -> u32 {
        1024
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GcConfig {
    #[serde(default = "GcConfig::default_trigger_bytes")]
    pub trigger_bytes: u64,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self { trigger_bytes: Self::default_trigger_bytes() }
    }
}

impl GcConfig {
    const fn default_trigger_bytes() -> u64 {
        4 * 1024 * 1024
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EvalConfig {
    #[serde(default = "EvalConfig::default_halt_poll_interval")]
    pub halt_poll_interval: u32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { halt_poll_interval: Self::default_halt_poll_interval() }
    }
}

impl EvalConfig {
    const fn default_halt_poll_interval() -> u32 {
        256
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScriptConfig {
    #[serde(default)]
    pub search_path: Vec<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub gc: GcConfig,
    #[serde(default)]
    pub eval: EvalConfig,
    #[serde(default)]
    pub script: ScriptConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile,
    pub path: Option<PathBuf>,
}

/// Best-effort config path: `$XDG_CONFIG_HOME/ren/ren.toml` (or the
/// platform equivalent via `dirs::config_dir`).
fn discover() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ren").join("ren.toml"))
}

/// Load config. `explicit`, when given, must exist and parse — an explicit
/// `--config` path the user typed wrong should fail loudly rather than
/// silently fall back. With no explicit path, a missing or unreadable
/// platform config file falls back to `ConfigFile::default()` quietly (spec
/// has no config file requirement; this is host convenience only).
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        return Ok(Config { file, path: Some(path.to_path_buf()) });
    }

    let Some(path) = discover() else {
        return Ok(Config::default());
    };
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => Ok(Config { file, path: Some(path) }),
            Err(_) => Ok(Config::default()),
        },
        Err(_) => Ok(Config::default()),
    }
}
