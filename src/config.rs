// file: src/config.rs
// description: application configuration management with json support
// reference: https://docs.rs/config

use crate::error::{MrgitError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Directories whose immediate children are probed for working copies.
    #[serde(default)]
    pub roots: Vec<PathBuf>,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    #[serde(default = "default_parallel_workers")]
    pub parallel_workers: usize,
    #[serde(default = "default_repo_timeout_secs")]
    pub repo_timeout_secs: u64,
    #[serde(default)]
    pub checkout_timeout_secs: Option<u64>,
}

fn default_parallel_workers() -> usize {
    4
}

fn default_repo_timeout_secs() -> u64 {
    30
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            parallel_workers: default_parallel_workers(),
            repo_timeout_secs: default_repo_timeout_secs(),
            checkout_timeout_secs: None,
        }
    }
}

impl RefreshConfig {
    pub fn repo_timeout(&self) -> Duration {
        Duration::from_secs(self.repo_timeout_secs)
    }

    pub fn checkout_timeout(&self) -> Option<Duration> {
        self.checkout_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// `~/.config/mrgit/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| MrgitError::Config("cannot determine home directory".to_string()))?;
        Ok(home.join(".config").join("mrgit").join("config.json"))
    }

    /// Loads `path` (when given) and overlays `MRGIT__*` environment variables.
    /// `MRGIT__ROOTS` takes a comma separated list.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();
        Self::load_from(path, environment())
    }

    fn load_from(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(env);

        let settings = builder
            .build()
            .map_err(|e| MrgitError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| MrgitError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn ensure_config_dir(path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.exists()
        {
            fs::create_dir_all(dir).map_err(|source| MrgitError::FileOperation {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.refresh.parallel_workers == 0 {
            return Err(MrgitError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.refresh.repo_timeout_secs == 0 {
            return Err(MrgitError::Config(
                "repo_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.refresh.checkout_timeout_secs == Some(0) {
            return Err(MrgitError::Config(
                "checkout_timeout_secs must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("MRGIT")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("roots")
        .try_parsing(true)
}
