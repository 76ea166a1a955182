//! Configuration surface for both storage backends.
//!
//! Every knob has a documented default so a missing or partial
//! `recordstore.toml` still yields a usable configuration. Credentials and
//! host settings from richer SQL deployments collapse to a database path
//! for the embedded SQLite backend.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the file store's `<Type>Table.json` files.
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// SQLite database file backing the relational store.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Upper bound on the `limit` accepted by paged reads.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Connections opened eagerly when the pool is constructed.
    #[serde(default = "default_initial_pool_size")]
    pub initial_pool_size: usize,

    /// Hard cap on connections the pool will ever have open at once.
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,

    /// Chunk size for transactional batch inserts and deletes.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
            database_path: default_database_path(),
            max_page_size: default_max_page_size(),
            initial_pool_size: default_initial_pool_size(),
            max_pool_size: default_max_pool_size(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./data")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./data/records.db")
}

const fn default_max_page_size() -> u32 {
    100
}

const fn default_initial_pool_size() -> usize {
    2
}

const fn default_max_pool_size() -> usize {
    8
}

const fn default_batch_size() -> usize {
    100
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("recordstore.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<StoreConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: StoreConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &StoreConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_storage_root(root: &Path) -> anyhow::Result<()> {
    if !root.as_os_str().is_empty() && !root.exists() {
        std::fs::create_dir_all(root)?;
    }
    Ok(())
}
