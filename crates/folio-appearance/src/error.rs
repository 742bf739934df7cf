//! Error types for appearance operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::DomainKind;

/// A value was rejected at a Domain Store boundary. No partial write happened.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field contained a value outside its declared set or range.
    #[error("invalid value for '{field}' in '{domain}': expected {expected}")]
    InvalidField {
        /// Domain that rejected the value.
        domain: DomainKind,
        /// Dotted path of the offending field.
        field: String,
        /// Offending value rendered as JSON.
        value: String,
        /// Accepted set or range.
        expected: String,
    },
    /// Field did not exist in the target domain.
    #[error("unknown field '{field}' in '{domain}' settings")]
    UnknownField {
        /// Domain where the unknown field was encountered.
        domain: DomainKind,
        /// Dotted path of the unexpected field.
        field: String,
    },
    /// Patch payload was not a JSON object.
    #[error("'{domain}' patch must be a JSON object")]
    PatchNotObject {
        /// Domain the patch was addressed to.
        domain: DomainKind,
    },
}

impl ValidationError {
    /// Dotted path of the field the error refers to, when there is one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidField { field, .. } | Self::UnknownField { field, .. } => Some(field),
            Self::PatchNotObject { .. } => None,
        }
    }

    /// Domain that raised the error.
    #[must_use]
    pub const fn domain(&self) -> DomainKind {
        match self {
            Self::InvalidField { domain, .. }
            | Self::UnknownField { domain, .. }
            | Self::PatchNotObject { domain } => *domain,
        }
    }
}

/// The Persistence Gateway could not durably store or read a domain.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem operation failed.
    #[error("filesystem operation '{operation}' failed for {}", path.display())]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Stored document could not be decoded.
    #[error("stored '{domain}' document is malformed")]
    Malformed {
        /// Domain whose document was malformed.
        domain: DomainKind,
        /// Source decoding error.
        source: serde_json::Error,
    },
    /// Configuration could not be encoded for storage.
    #[error("failed to encode '{domain}' configuration")]
    Encode {
        /// Domain that failed to encode.
        domain: DomainKind,
        /// Source encoding error.
        source: serde_json::Error,
    },
    /// Backend-specific failure (database, remote service).
    #[error("storage backend operation '{operation}' failed")]
    Backend {
        /// Operation identifier.
        operation: &'static str,
        /// Source backend error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Backend refused the request without a more specific cause.
    #[error("storage backend unavailable: {message}")]
    Unavailable {
        /// Operator-facing detail.
        message: String,
    },
}

/// Failure of an operation that both edits and persists a domain.
#[derive(Debug, Error)]
pub enum AppearanceError {
    /// The edit was rejected; nothing changed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The edit was applied in memory but could not be stored.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Convenience alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Convenience alias for persistence results.
pub type PersistResult<T> = Result<T, PersistError>;
