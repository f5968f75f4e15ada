//! Application error type.
//!
//! Everything here is a startup or command failure. Per-request problems
//! never reach this type; the handler turns them into a page banner.

use checkmysugar_core::{DatasetError, ForestError, FormatError, SchemaError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to fetch dataset from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid dataset: {0}")]
    Dataset(#[from] DatasetError),

    #[error("training failed: {0}")]
    Training(#[from] ForestError),

    #[error("model snapshot error: {0}")]
    Snapshot(#[from] FormatError),

    #[error("invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, AppError>;
