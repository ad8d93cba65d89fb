//! Catalog loading errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Catalog file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Catalog validation error: {0}")]
    Validation(String),
}
