use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to access preferences {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preferences file is not a string map: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Preferences(#[from] PreferenceError),
    #[error("preference store lock poisoned")]
    Poisoned,
}
