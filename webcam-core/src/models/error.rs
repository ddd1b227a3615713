use thiserror::Error;

/// Errors surfaced by the webcam widget and its host capabilities.
///
/// Only acquisition failures reach the completion callback. Everything else
/// is either logged or returned from internal helpers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WebcamError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("device enumeration failed: {0}")]
    EnumerationFailed(String),

    #[error("acquisition failed: {0}")]
    AcquisitionFailed(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<image::ImageError> for WebcamError {
    fn from(e: image::ImageError) -> Self {
        WebcamError::EncodingFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = WebcamError::EnumerationFailed("NotAllowedError: blocked".into());
        assert_eq!(
            err.to_string(),
            "device enumeration failed: NotAllowedError: blocked"
        );
        assert_eq!(WebcamError::PermissionDenied.to_string(), "permission denied");
    }
}
