use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "rolo";

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Resolved runtime configuration. The store directory holds the keyed
/// record database, the mirror directory holds the flat CSV export.
#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub store_dir: PathBuf,
    pub mirror_dir: PathBuf,
    pub page_size: usize,
}

impl Config {
    pub fn db_path(&self) -> PathBuf {
        self.store_dir.join("contacts.db")
    }

    pub fn mirror_path(&self) -> PathBuf {
        self.mirror_dir.join("contacts.csv")
    }

    /// Create the store and mirror directories. Safe to re-run.
    pub fn init_dirs(&self) -> Result<()> {
        for dir in [&self.store_dir, &self.mirror_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    store_dir: Option<PathBuf>,
    mirror_dir: Option<PathBuf>,
    page_size: Option<usize>,
}

/// Load configuration from `override_path` or the platform config dir.
/// A missing file yields the defaults; a malformed file is an error.
pub fn load(override_path: Option<&Path>) -> Result<Config> {
    let config_path = match override_path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    let raw = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config at {}", config_path.display()))?;
        toml::from_str::<RawConfig>(&content)
            .with_context(|| format!("failed to parse config at {}", config_path.display()))?
    } else {
        RawConfig::default()
    };

    let data_dir = default_data_dir()?;
    let store_dir = raw
        .store_dir
        .map(|p| expand_tilde(&p))
        .unwrap_or_else(|| data_dir.join("db"));
    let mirror_dir = raw
        .mirror_dir
        .map(|p| expand_tilde(&p))
        .unwrap_or_else(|| data_dir.join("export"));

    Ok(Config {
        config_path,
        store_dir,
        mirror_dir,
        page_size: raw.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
    })
}

fn default_config_path() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine config directories")?;
    Ok(base.config_dir().join(APP_NAME).join(CONFIG_FILE_NAME))
}

fn default_data_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine data directories")?;
    Ok(base.data_dir().join(APP_NAME))
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
