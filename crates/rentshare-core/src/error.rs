//! Error types for rentshare core operations.
//!
//! `NotFound`, `InvalidArgument` and `Conflict` abort the single operation
//! that raised them and are meant to be shown to the caller as rejections.
//! `PartialFailure` only ever comes out of a fee recalculation batch that
//! ran to completion but skipped some records.

use thiserror::Error;

/// Result type alias for rentshare operations.
pub type Result<T> = std::result::Result<T, RentshareError>;

/// Core error type for rentshare operations.
#[derive(Debug, Error)]
pub enum RentshareError {
    /// Referenced property, owner, record or ownership version does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Percentage out of range, malformed period, negative amount, ...
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Concurrent write collision or uniqueness violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A batch completed but skipped some records
    #[error("Partial failure: {skipped} record(s) skipped")]
    PartialFailure {
        skipped: usize,
        reasons: Vec<String>,
    },

    /// Stored data failed a consistency check
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RentshareError {
    /// Whether the error is a rejection of the caller's request rather than
    /// a failure of the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::InvalidArgument(_) | Self::Conflict(_)
        )
    }
}

impl From<rusqlite::Error> for RentshareError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, _)
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                RentshareError::Conflict(err.to_string())
            }
            other => RentshareError::Storage(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for RentshareError {
    fn from(err: serde_json::Error) -> Self {
        RentshareError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(RentshareError::NotFound("x".into()).is_client_error());
        assert!(RentshareError::InvalidArgument("x".into()).is_client_error());
        assert!(RentshareError::Conflict("x".into()).is_client_error());
        assert!(!RentshareError::Storage("x".into()).is_client_error());
    }

    #[test]
    fn test_partial_failure_message() {
        let err = RentshareError::PartialFailure {
            skipped: 2,
            reasons: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "Partial failure: 2 record(s) skipped");
    }
}
