use thiserror::Error;

use crate::client::TransportError;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("no data found in response")]
    MissingDocument,

    #[error("no valid script content")]
    NoScriptContent,

    #[error("empty response from source")]
    EmptySource,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MigrateError>;
