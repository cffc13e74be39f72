//! Error types for the head-tilt page turning library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Filter initialization or processing error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Pose estimation failed for a single tick
    #[error("Pose estimation error: {0}")]
    PoseEstimation(String),

    /// Recorded pose trace could not be read
    #[error("Trace error: {0}")]
    TraceError(String),
}

/// Application-specific error type (alias for main Error type)
pub type AppError = Error;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error only affects the current tick.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::PoseEstimation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::PoseEstimation("backend busy".into()).is_transient());
        assert!(!Error::ConfigError("bad".into()).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = Error::ConfigError("dead zone too wide".to_string());
        assert_eq!(err.to_string(), "Configuration error: dead zone too wide");
    }
}
