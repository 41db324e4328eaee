// src/error.rs
//
// Crate error type and Result alias.

use thiserror::Error;

/// Errors from the fallible edges of the crate: files, class-map config and model output.
///
/// The text transforms themselves ([`crate::coerce`], [`crate::annotate`]) never fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid class map: {0}")]
    ClassMap(#[source] serde_json::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model output contains no JSON object")]
    NoJsonObject,
}

pub type Result<T> = std::result::Result<T, Error>;
