//! Error types for the data access layer.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use folio_appearance::PersistError;

/// Result alias for data layer operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors raised by the data access layer.
#[derive(Debug)]
pub enum DataError {
    /// Could not open a connection pool.
    ConnectFailed {
        /// Underlying connection error.
        source: sqlx::Error,
    },
    /// Migration execution failed.
    MigrationFailed {
        /// Underlying migration error.
        source: sqlx::migrate::MigrateError,
    },
    /// A database operation failed.
    QueryFailed {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying SQL error.
        source: sqlx::Error,
    },
}

impl DataError {
    const fn operation(&self) -> &'static str {
        match self {
            Self::ConnectFailed { .. } => "connect",
            Self::MigrationFailed { .. } => "migrate",
            Self::QueryFailed { operation, .. } => *operation,
        }
    }
}

impl Display for DataError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed { .. } => formatter.write_str("failed to connect to database"),
            Self::MigrationFailed { .. } => formatter.write_str("migration failed"),
            Self::QueryFailed { operation, .. } => {
                write!(formatter, "database operation '{operation}' failed")
            }
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ConnectFailed { source } | Self::QueryFailed { source, .. } => Some(source),
            Self::MigrationFailed { source } => Some(source),
        }
    }
}

impl From<DataError> for PersistError {
    fn from(err: DataError) -> Self {
        Self::Backend {
            operation: err.operation(),
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_error_display_and_source() {
        let migration = DataError::MigrationFailed {
            source: sqlx::migrate::MigrateError::VersionMissing(1),
        };
        assert_eq!(migration.to_string(), "migration failed");
        assert!(migration.source().is_some());

        let query = DataError::QueryFailed {
            operation: "upsert appearance setting",
            source: sqlx::Error::RowNotFound,
        };
        assert_eq!(
            query.to_string(),
            "database operation 'upsert appearance setting' failed"
        );
        assert!(query.source().is_some());
    }

    #[test]
    fn data_errors_become_backend_persist_errors() {
        let persist = PersistError::from(DataError::QueryFailed {
            operation: "fetch appearance setting",
            source: sqlx::Error::PoolTimedOut,
        });
        match persist {
            PersistError::Backend { operation, source } => {
                assert_eq!(operation, "fetch appearance setting");
                assert!(source.to_string().contains("fetch appearance setting"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
