//! Error types for mds-sql

use crate::version::Version;
use thiserror::Error;

/// Result type alias for statement generation.
pub type SqlGenResult<T> = Result<T, SqlGenError>;

/// Error types for statement generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlGenError {
    /// The requested MDS version is outside the supported release range.
    #[error("Unsupported MDS version: {0}")]
    UnsupportedVersion(Version),

    /// The version text could not be parsed as `MAJOR.MINOR[.PATCH]`.
    #[error("Invalid MDS version: '{0}'")]
    InvalidVersion(String),
}

impl SqlGenError {
    /// Create an invalid version error
    pub fn invalid_version(raw: impl Into<String>) -> Self {
        Self::InvalidVersion(raw.into())
    }

    /// Check if this is an unsupported version error
    pub fn is_unsupported_version(&self) -> bool {
        matches!(self, Self::UnsupportedVersion(_))
    }

    /// The offending version, if the error carries one.
    pub fn version(&self) -> Option<Version> {
        match self {
            Self::UnsupportedVersion(v) => Some(*v),
            Self::InvalidVersion(_) => None,
        }
    }
}
