// Domain error types

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("roster is empty")]
    Empty,
    #[error("roster header is missing required columns: {0}")]
    MissingColumns(String),
    #[error("malformed roster: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("scanner unavailable: {0}")]
    Unavailable(String),
    #[error("scanner is already in use")]
    Busy,
}
