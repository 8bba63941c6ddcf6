//! Error types for chronoshift operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShiftError {
    #[error("Invalid duration: {0}")]
    Parse(String),

    #[error("Invalid timezone: {0}")]
    UnknownZone(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, ShiftError>;
