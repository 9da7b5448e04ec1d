// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the photo booth
//!
//! Each subsystem owns a small error enum. They all convert into [`AppError`],
//! which is what the booth controller and the CLI propagate.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for filter engine operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Result type alias for persistence operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Main application error type
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Camera acquisition errors
    Acquisition(AcquisitionError),
    /// Filter engine errors
    Filter(FilterError),
    /// Photo capture errors
    Photo(PhotoError),
    /// Persistence errors
    Storage(StorageError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Camera acquisition errors
///
/// Fatal to the operation that raised them, never to the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    /// No camera devices found
    NoCameraFound,
    /// The OS refused access to the device
    PermissionDenied(String),
    /// Device enumeration failed
    EnumerationFailed(String),
    /// The selected device does not exist
    DeviceNotFound(String),
    /// Device opened but streaming could not start
    StreamFailed(String),
}

/// Filter engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Zero-sized frame or pixel buffer that does not match its dimensions
    InvalidFrame {
        width: u32,
        height: u32,
        len: usize,
    },
    /// A filter name outside the known set
    UnknownFilter(String),
}

/// Photo capture errors
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoError {
    /// No frame available for capture
    NoFrameAvailable,
    /// Nothing has been captured yet
    NoCapture,
    /// Filtering the still failed
    Filter(FilterError),
    /// Encoding failed
    EncodingFailed(String),
}

/// Persistence errors
///
/// The in-memory library stays valid when these occur, so the caller can retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store refused the write because it would exceed its quota
    QuotaExceeded { required: usize, limit: usize },
    /// Filesystem failure
    Io(String),
    /// The library could not be (de)serialized
    Serialization(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Acquisition(e) => write!(f, "Camera error: {}", e),
            AppError::Filter(e) => write!(f, "Filter error: {}", e),
            AppError::Photo(e) => write!(f, "Photo error: {}", e),
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::NoCameraFound => write!(f, "No camera devices found"),
            AcquisitionError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            AcquisitionError::EnumerationFailed(msg) => {
                write!(f, "Device enumeration failed: {}", msg)
            }
            AcquisitionError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            AcquisitionError::StreamFailed(msg) => write!(f, "Failed to start stream: {}", msg),
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::InvalidFrame { width, height, len } => write!(
                f,
                "Invalid frame: {}x{} with {} bytes of pixel data",
                width, height, len
            ),
            FilterError::UnknownFilter(name) => write!(f, "Unknown filter: {}", name),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::NoFrameAvailable => write!(f, "No frame available for capture"),
            PhotoError::NoCapture => write!(f, "No photo has been captured"),
            PhotoError::Filter(e) => write!(f, "Filtering failed: {}", e),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::QuotaExceeded { required, limit } => write!(
                f,
                "Storage quota exceeded: {} bytes needed, {} allowed",
                required, limit
            ),
            StorageError::Io(msg) => write!(f, "I/O error: {}", msg),
            StorageError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for AcquisitionError {}
impl std::error::Error for FilterError {}
impl std::error::Error for PhotoError {}
impl std::error::Error for StorageError {}

impl From<AcquisitionError> for AppError {
    fn from(err: AcquisitionError) -> Self {
        AppError::Acquisition(err)
    }
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::Filter(err)
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        AppError::Photo(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<FilterError> for PhotoError {
    fn from(err: FilterError) -> Self {
        PhotoError::Filter(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<image::ImageError> for PhotoError {
    fn from(err: image::ImageError) -> Self {
        PhotoError::EncodingFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_errors_convert_into_app_error() {
        let err: AppError = StorageError::Io("disk gone".into()).into();
        assert_eq!(err.to_string(), "Storage error: I/O error: disk gone");

        let err: AppError = AcquisitionError::NoCameraFound.into();
        assert!(matches!(err, AppError::Acquisition(_)));

        let err: AppError = AcquisitionError::EnumerationFailed("/dev: gone".into()).into();
        assert_eq!(
            err.to_string(),
            "Camera error: Device enumeration failed: /dev: gone"
        );
    }

    #[test]
    fn test_invalid_frame_message_names_dimensions() {
        let err = FilterError::InvalidFrame {
            width: 0,
            height: 4,
            len: 0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid frame: 0x4 with 0 bytes of pixel data"
        );
    }
}
