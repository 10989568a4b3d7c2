//! Error types for wipeguard library
//!
//! Business outcomes of a wipe code change (cancelled, PIN invalid,
//! rejected) are values of [`crate::model::OperationResult`]. The types
//! here cover the failures that abort an operation outright: a broken
//! interactive channel or an unreadable credential store.

use thiserror::Error;

/// Result type alias for wipeguard operations
pub type WipeguardResult<T> = Result<T, WipeguardError>;

/// Result type alias for a single transport interaction
pub type TransportResult<T> = Result<T, TransportError>;

/// Top-level error type for all wipeguard operations
#[derive(Error, Debug)]
pub enum WipeguardError {
    /// Interactive channel errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Credential store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors raised at a transport suspension point
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The user backed out of a prompt or dialog
    #[error("Action cancelled by user")]
    Cancelled,

    /// The channel to the user went away
    #[error("Transport disconnected: {reason}")]
    Disconnected { reason: String },
}

/// Credential store errors (opening, creating, decoding)
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed store file: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store content decoded but violates the record layout
    #[error("Corrupt credential record: {reason}")]
    Corrupt { reason: String },

    #[error("Store already exists at {path}")]
    AlreadyExists { path: String },
}

impl From<std::io::Error> for WipeguardError {
    fn from(err: std::io::Error) -> Self {
        WipeguardError::Storage(StorageError::Io(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WipeguardError::Transport(TransportError::Cancelled);
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn test_storage_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: WipeguardError = io.into();
        assert!(matches!(err, WipeguardError::Storage(StorageError::Io(_))));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_result_type_alias() {
        let result: WipeguardResult<i32> = Ok(42);
        assert_eq!(result.unwrap(), 42);

        let result: WipeguardResult<i32> = Err(TransportError::Disconnected {
            reason: "usb".to_string(),
        }
        .into());
        assert!(result.is_err());
    }
}
