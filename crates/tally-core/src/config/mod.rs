use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};

/// Layered configuration for Tally.
///
/// Sources, later layers overriding earlier ones:
/// 1. global `~/.config/tally/config.toml`
/// 2. project-local `.tally/config.toml` in the working directory
///
/// Every field has a default, so missing files and empty sections are
/// fine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TallyConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Custom path for the SQLite database.
    /// Defaults to `~/.local/share/tally/tally.db`.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Master switch for hook recording. When false the hook binary
    /// drops events without touching the database.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl TallyConfig {
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(dir) = project_dir {
            let project_config = dir.join(".tally").join("config.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }
        }

        let config = builder
            .build()
            .map_err(|e| TallyError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| TallyError::Config(e.to_string()))
    }

    /// The database path to use: explicit override first, then config,
    /// then the XDG default.
    pub fn db_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(p) = override_path {
            return Ok(p.to_path_buf());
        }
        if let Some(p) = &self.storage.path {
            return Ok(PathBuf::from(p));
        }
        crate::storage::default_db_path()
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tally").join("config.toml"))
}
