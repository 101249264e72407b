// Dance Skeleton 🕺 AGPL-3.0 License

//! Error types for the skeleton overlay library.

use std::fmt;

/// Result type alias for skeleton overlay operations.
pub type Result<T> = std::result::Result<T, SkeletonError>;

/// Main error type for the library.
#[derive(Debug)]
pub enum SkeletonError {
    /// Error loading or downloading the pose model.
    ModelLoadError(String),
    /// Error during model inference.
    InferenceError(String),
    /// Error decoding or manipulating frames.
    ImageError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// IO error (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`.
    Io(std::io::Error),
    /// Error parsing model metadata.
    MetadataError(String),
    /// Video decode/encode error.
    VideoError(String),
    /// Display window error.
    ViewerError(String),
    /// Feature not enabled at compile time.
    FeatureNotEnabled(String),
}

impl fmt::Display for SkeletonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::MetadataError(msg) => write!(f, "Metadata error: {msg}"),
            Self::VideoError(msg) => write!(f, "Video error: {msg}"),
            Self::ViewerError(msg) => write!(f, "Viewer error: {msg}"),
            Self::FeatureNotEnabled(msg) => write!(f, "Feature not enabled: {msg}"),
        }
    }
}

impl std::error::Error for SkeletonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SkeletonError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for SkeletonError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SkeletonError::ModelLoadError("test".to_string());
        assert_eq!(err.to_string(), "Model load error: test");

        let err = SkeletonError::VideoError("test".to_string());
        assert_eq!(err.to_string(), "Video error: test");
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error;
        let err = SkeletonError::Io(std::io::Error::other("inner"));
        assert!(err.source().is_some());

        let err = SkeletonError::ConfigError("no source".to_string());
        assert!(err.source().is_none());
    }
}
