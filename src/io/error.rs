//! Error types and context management for style transfer operations

use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for all style transfer operations
#[derive(Debug)]
pub enum TransferError {
    /// Failed to open or decode a source image
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image decoding error
        source: image::ImageError,
    },

    /// Failed to encode or save a generated image
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image encoding error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Pretrained backbone weights could not be located or loaded
    Weights {
        /// Path of the weights file
        path: PathBuf,
        /// Underlying framework error
        source: tch::TchError,
    },

    /// A tensor operation inside the framework failed
    Tensor {
        /// Name of the operation that failed
        operation: &'static str,
        /// Underlying framework error
        source: tch::TchError,
    },

    /// Configuration value failed validation
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// A tensor or buffer did not have the expected layout
    ShapeMismatch {
        /// What was being checked
        what: &'static str,
        /// Expected dimensions
        expected: Vec<i64>,
        /// Dimensions actually found
        actual: Vec<i64>,
    },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Weights { path, source } => {
                write!(
                    f,
                    "Failed to load backbone weights from '{}': {source}",
                    path.display()
                )
            }
            Self::Tensor { operation, source } => {
                write!(f, "Tensor error in {operation}: {source}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::ShapeMismatch {
                what,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Unexpected shape for {what}: expected {expected:?}, found {actual:?}"
                )
            }
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Weights { source, .. } | Self::Tensor { source, .. } => Some(source),
            Self::InvalidParameter { .. } | Self::ShapeMismatch { .. } => None,
        }
    }
}

/// Convenience type alias for style transfer results
pub type Result<T> = std::result::Result<T, TransferError>;

/// Attaches the path and operation to bare I/O failures
pub trait WithPath<T> {
    /// Convert an I/O error into [`TransferError::FileSystem`]
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path and operation applied
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T>;
}

impl<T> WithPath<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T> {
        self.map_err(|source| TransferError::FileSystem {
            path: path.to_path_buf(),
            operation,
            source,
        })
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> TransferError {
    TransferError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a tensor error for a named operation
pub const fn tensor_error(operation: &'static str, source: tch::TchError) -> TransferError {
    TransferError::Tensor { operation, source }
}
