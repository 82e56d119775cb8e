//! Error types for gpio-sim operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// gpio-sim specific errors
#[derive(Debug, Error)]
pub enum GpioSimError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The simulator description cannot be taken live
    #[error("Invalid simulator description: {0}")]
    InvalidSpecification(String),

    /// A simulator with the requested name already exists
    #[error("Simulator with name '{0}' already exists")]
    NameConflict(String),

    /// gpio-sim could not be found in configfs
    #[error("gpio-sim is not available: {0}")]
    EnvironmentUnavailable(String),

    /// A symlink at the device path is masking the simulated chip
    #[error("A symlink ({}) is masking GPIO device {chip}", .path.display())]
    DeviceMasked { path: PathBuf, chip: String },

    /// A configfs or sysfs attribute held text outside its known vocabulary
    #[error("Unexpected value '{value}' in attribute '{}'", .path.display())]
    UnexpectedAttributeValue { path: PathBuf, value: String },

    /// Failed to read an attribute
    #[error("Failed to read attribute '{}': {source}", .path.display())]
    AttrRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write an attribute
    #[error("Failed to write attribute '{}': {source}", .path.display())]
    AttrWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to create a configfs directory
    #[error("Failed to create directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to remove a configfs directory
    #[error("Failed to remove directory '{}': {source}", .path.display())]
    RemoveDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Simulator description file could not be parsed
    #[error("Invalid simulator config: {0}")]
    Config(String),
}

impl GpioSimError {
    /// The underlying I/O error, if this error came from the filesystem.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Io(e) => Some(e),
            Self::AttrRead { source, .. }
            | Self::AttrWrite { source, .. }
            | Self::CreateDir { source, .. }
            | Self::RemoveDir { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the error was caused by a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        self.io_error()
            .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
    }
}

/// Result type for gpio-sim operations
pub type Result<T> = std::result::Result<T, GpioSimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err = GpioSimError::AttrRead {
            path: PathBuf::from("/nonexistent/pull"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.is_not_found());

        let err = GpioSimError::RemoveDir {
            path: PathBuf::from("/busy"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(!err.is_not_found());
        assert!(err.io_error().is_some());

        let err = GpioSimError::NameConflict("sim".into());
        assert!(!err.is_not_found());
        assert!(err.io_error().is_none());
    }

    #[test]
    fn test_display_includes_path() {
        let err = GpioSimError::UnexpectedAttributeValue {
            path: PathBuf::from("/sys/x/sim_gpio3/pull"),
            value: "pull-sideways".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("pull-sideways"));
        assert!(msg.contains("/sys/x/sim_gpio3/pull"));
    }
}
