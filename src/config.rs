use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, eyre};
use serde::Deserialize;

use crate::system::platform::DEFAULT_MAX_TASKS;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub cpu: CpuConfig,
    pub memory: MemoryConfig,
    pub census: CensusConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub poll_interval_ms: u64,
    pub log_format: String,
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            poll_interval_ms: 2000,
            log_format: "text".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub stat_path: PathBuf,
}

impl Default for CpuConfig {
    fn default() -> Self {
        CpuConfig {
            stat_path: PathBuf::from("/proc/stat"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub meminfo_path: PathBuf,
    /// Bytes per counted memory unit; unset means whatever the platform reports.
    pub page_size: Option<u64>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            meminfo_path: PathBuf::from("/proc/meminfo"),
            page_size: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CensusConfig {
    pub max_tasks: usize,
}

impl Default for CensusConfig {
    fn default() -> Self {
        CensusConfig {
            max_tasks: DEFAULT_MAX_TASKS,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hostprobe").join("config.toml"))
}

impl Config {
    /// Rejects values that would make every snapshot meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.general.poll_interval_ms == 0 {
            return Err(eyre!("poll interval must be greater than 0"));
        }
        if self.census.max_tasks == 0 {
            return Err(eyre!("census.max_tasks must be greater than 0"));
        }
        Ok(())
    }
}

pub fn load_config() -> Result<Config> {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Ok(Config::default()),
    }
}

/// A missing file yields the defaults; an unparsable one is an error so the
/// caller can report it once logging is up.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents)
            .map_err(|err| eyre!("invalid config {}: {err}", path.display())),
        Err(_) => Ok(Config::default()),
    }
}
