//! Error types for confsched-core

use thiserror::Error;

use crate::http::TransportError;

/// Failure of a lazy detail fetch.
///
/// A 404 on the detail resource is not represented here: it is absorbed
/// by the lazy loader as a terminal per-entity state and only logged.
#[derive(Error, Debug)]
pub enum LazyLoadError {
    #[error("transport error during lazy load: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed detail payload: {0}")]
    Parse(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LazyLoadError>;
