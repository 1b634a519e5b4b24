//! Error taxonomy shared across the library.
//!
//! Components recover locally where a fallback exists (brand table, mock
//! restaurant list, static unavailable message); everything else surfaces
//! as one of these variants so the caller can show a specific message.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{service} is unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    #[error("Malformed response from generation backend: {0}")]
    MalformedResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl AppError {
    /// Availability error naming the backend that could not be reached.
    pub fn unavailable(service: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Unavailable {
            service: service.into(),
            reason: reason.to_string(),
        }
    }
}

/// Typed failure reasons for the camera and geolocation collaborators.
///
/// Each variant maps to the specific human-readable message shown to the
/// user; geolocation failures additionally trigger the demonstration-data
/// fallback in the nearby flow.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Camera access denied. Please allow camera permissions and try again.")]
    CameraDenied,

    #[error("No camera found on this device.")]
    CameraNotFound,

    #[error("Camera capture is not supported on this device.")]
    CameraUnsupported,

    #[error("Failed to access camera. Please try again.")]
    CameraFailed,

    #[error("Location access denied. Please enable location permissions.")]
    LocationDenied,

    #[error("Location information is unavailable.")]
    LocationUnavailable,

    #[error("Location request timed out.")]
    LocationTimeout,

    #[error("Location services are not supported on this device.")]
    LocationUnsupported,
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
