//! Crate-wide error type.
//!
//! Every failure is local to the operation that raised it: nothing here
//! carries partially produced output, and no variant implies the in-memory
//! document was touched.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A collaborator (rasterizer, text generator) is absent or unconfigured.
    #[error("{0} is not available")]
    MissingCapability(String),

    #[error("Export staging failed: {0}")]
    Staging(String),

    #[error("Rasterization failed: {0}")]
    Raster(String),

    #[error("Text generation failed, please try again ({0})")]
    Generation(String),

    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("E-mail failed: {0}")]
    Mail(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<taffy::TaffyError> for Error {
    fn from(e: taffy::TaffyError) -> Self {
        Error::Staging(format!("layout engine: {e}"))
    }
}
