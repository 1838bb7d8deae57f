//! Catalog failures: catalog files on one side, the redb database on the other.

use std::path::PathBuf;

use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog file: {0}")]
    Format(#[from] toml::de::Error),

    #[error("cannot open catalog database: {0}")]
    Open(String),

    #[error("catalog transaction failed: {0}")]
    Transaction(String),

    #[error("catalog table unavailable: {0}")]
    Table(String),

    #[error("catalog storage error: {0}")]
    Storage(String),

    #[error("cannot encode catalog entry {key}: {message}")]
    Encode { key: String, message: String },

    #[error("corrupt catalog entry {key}: {message}")]
    Decode { key: String, message: String },
}

impl CatalogError {
    pub(crate) fn encode(key: &str, err: serde_json::Error) -> Self {
        Self::Encode {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(key: &str, err: serde_json::Error) -> Self {
        Self::Decode {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}
