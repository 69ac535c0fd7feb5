//! Configuration loading for MediRisk.
//! Reads medirisk.toml from `--config`, the MEDIRISK_CONFIG env var, or the
//! current directory, in that order.

use std::path::{Path, PathBuf};

use anyhow::Context;
use medirisk_common::ModelKind;
use medirisk_preprocess::PreprocessOptions;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "medirisk.toml";
pub const CONFIG_ENV_VAR: &str = "MEDIRISK_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String { "medirisk=debug,info".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            models: ModelsConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_raw_path")]
    pub raw_path: PathBuf,
    #[serde(default = "default_cleaned_path")]
    pub cleaned_path: PathBuf,
    #[serde(flatten)]
    pub preprocess: PreprocessOptions,
}

fn default_raw_path()     -> PathBuf { PathBuf::from("data/heart_raw.csv") }
fn default_cleaned_path() -> PathBuf { PathBuf::from("data/heart_cleaned.csv") }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_path: default_raw_path(),
            cleaned_path: default_cleaned_path(),
            preprocess: PreprocessOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_models_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub default: ModelKind,
}

fn default_models_dir() -> PathBuf { PathBuf::from("models") }

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: default_models_dir(),
            default: ModelKind::default(),
        }
    }
}

#[cfg(test)]
mod tests;

impl Config {
    /// Load configuration.
    ///
    /// An explicitly requested file (flag or env var) must exist. When
    /// neither is set and ./medirisk.toml is absent, defaults are used.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let requested = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        let path = match requested {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                path
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.data.preprocess.validate()?;
        Ok(config)
    }
}
