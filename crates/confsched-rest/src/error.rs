//! Error types for confsched-rest

use confsched_core::TransportError;
use thiserror::Error;

/// confsched-rest error type.
///
/// The activation/save/validation variants carry the stable user-facing
/// messages; status details are logged at the call site, not encoded
/// here. Nothing in this layer retries automatically.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// A caller precondition was violated; no network call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("MySchedule activation failed. Please try again later.")]
    ActivationFailed,

    #[error("Activation code rejected. Please try signing in again.")]
    ActivationRejected,

    #[error("Adding to MySchedule failed. Please try again later.")]
    SaveFailed,

    #[error("MySchedule validation failed. Please try again later.")]
    ValidationFailed,

    #[error("Couldn't connect to MySchedule. Please try again later. ({0})")]
    FetchFailed(String),

    #[error("schedule parse error: {0}")]
    Parse(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ScheduleError>;
