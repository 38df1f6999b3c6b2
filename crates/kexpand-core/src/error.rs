//! Expansion errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error reading file {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading from stdin: {0}")]
    StdinRead(#[source] std::io::Error),

    #[error("error parsing yaml file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unexpected value {0:?}, expected key=value")]
    MalformedPair(String),

    #[error("key not found: {0:?}")]
    KeyNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
