use std::io;

use thiserror::Error;

/// Errors surfaced by network construction and model persistence.
///
/// Shape violations inside the numeric hot path (a vector of the wrong length
/// handed to `predict`, mismatched dataset lengths, ...) are contract
/// violations and panic instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid architecture: {0}")]
    Architecture(String),

    #[error("corrupt model file: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, Error>;
