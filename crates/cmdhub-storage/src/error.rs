//! Error types for the storage crate.

use thiserror::Error;

pub use cmdhub_core::storage::StorageError as CoreStorageError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Storage error types.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Storage/Database error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// Convert to the core storage error used by `SnapshotStore`
impl From<Error> for CoreStorageError {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(e) => CoreStorageError::Io(e),
            Error::Serialization(s) => CoreStorageError::Serialization(s),
            Error::Storage(s) => CoreStorageError::Backend(s),
            Error::InvalidInput(s) => CoreStorageError::Configuration(s),
        }
    }
}

// External error conversions
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<CoreStorageError> for Error {
    fn from(e: CoreStorageError) -> Self {
        match e {
            CoreStorageError::Io(e) => Error::Io(e),
            CoreStorageError::Serialization(s) => Error::Serialization(s),
            other => Error::Storage(other.to_string()),
        }
    }
}

#[cfg(feature = "redb")]
mod redb_conversions {
    use super::Error;

    impl From<redb::Error> for Error {
        fn from(e: redb::Error) -> Self {
            Error::Storage(format!("Redb error: {}", e))
        }
    }

    impl From<redb::TransactionError> for Error {
        fn from(e: redb::TransactionError) -> Self {
            Error::Storage(format!("Redb transaction error: {}", e))
        }
    }

    impl From<redb::TableError> for Error {
        fn from(e: redb::TableError) -> Self {
            Error::Storage(format!("Redb table error: {}", e))
        }
    }

    impl From<redb::StorageError> for Error {
        fn from(e: redb::StorageError) -> Self {
            Error::Storage(format!("Redb storage error: {}", e))
        }
    }

    impl From<redb::CommitError> for Error {
        fn from(e: redb::CommitError) -> Self {
            Error::Storage(format!("Redb commit error: {}", e))
        }
    }

    impl From<redb::DatabaseError> for Error {
        fn from(e: redb::DatabaseError) -> Self {
            Error::Storage(format!("Redb database error: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_core_error() {
        let core: CoreStorageError = Error::Storage("locked".to_string()).into();
        assert!(matches!(core, CoreStorageError::Backend(ref s) if s == "locked"));

        let core: CoreStorageError = Error::InvalidInput("bad path".to_string()).into();
        assert!(matches!(core, CoreStorageError::Configuration(_)));
    }
}
