//! Application configuration loaded from `config.toml`.
//!
//! Every field has a default, so a missing or partial file is valid.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipeline::{PipelineConfig, FIT_THRESHOLD_PX, PAGE_HEIGHT_PX, PAGE_WIDTH_PX};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub export: ExportConfig,
    pub assist: AssistConfig,
    pub storage: StorageConfig,
}

/// Staging geometry and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub page_width_px: f32,
    pub page_height_px: f32,
    /// Content shorter than this, but taller than a page, is shrunk onto
    /// a single page.
    pub fit_threshold_px: f32,
    pub settle_delay_ms: u64,
    /// Upper bound on waiting for any one image.
    pub image_timeout_ms: u64,
    /// Device pixels per CSS pixel for PNG output.
    pub raster_scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_width_px: PAGE_WIDTH_PX,
            page_height_px: PAGE_HEIGHT_PX,
            fit_threshold_px: FIT_THRESHOLD_PX,
            settle_delay_ms: 500,
            image_timeout_ms: 10_000,
            raster_scale: 2.0,
        }
    }
}

impl ExportConfig {
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            page_width: self.page_width_px,
            page_height: self.page_height_px,
            fit_threshold: self.fit_threshold_px,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    pub model: String,
    /// Environment variable holding the API credential.
    pub api_key_env: String,
    pub endpoint: Option<String>,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".to_string(),
            api_key_env: "API_KEY".to_string(),
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

/// Per-user directories for this application, if the platform has any.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "invoice-forge")
}

/// `config.toml` in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// `store.json` in the platform data directory.
pub fn default_store_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("store.json"))
}

impl AppConfig {
    /// Load an explicit file, failing if it cannot be read.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load `explicit` when given; otherwise the default location, where a
    /// missing file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                log::debug!("loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Where the key-value store lives: configured path, else the data dir.
    pub fn store_path(&self) -> Option<PathBuf> {
        self.storage.path.clone().or_else(default_store_path)
    }
}
