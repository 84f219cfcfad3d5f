use backend_domain::{DeviceError, GatewayError, RosterError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("scanner device: {0}")]
    Device(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<RosterError> for AppError {
    fn from(err: RosterError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Conflict(detail) => AppError::Conflict(detail),
            GatewayError::Backend(err) => AppError::Backend(err),
        }
    }
}

impl From<DeviceError> for AppError {
    fn from(err: DeviceError) -> Self {
        AppError::Device(err.to_string())
    }
}
