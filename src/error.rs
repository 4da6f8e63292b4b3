//! Error types for xsd-featuretypes
//!
//! This module defines all error types used throughout the library.
//! Failures carry the offending qualified name and nothing else; callers
//! are expected to wrap them with schema or file context of their own.

use thiserror::Error;

use crate::namespaces::QName;
use crate::types::TypeTag;

/// Result type alias using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for type resolution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No declaration, definition or registered type exists for a name
    #[error("not found: '{0}'")]
    NotFound(QName),

    /// A schema element carries no usable type definition
    #[error("element '{0}' has no type definition, fix it in the schema")]
    MissingTypeDefinition(QName),

    /// A name was pushed on the in-progress stack while already on it
    #[error("recursion guard violated: '{0}' is already under construction")]
    RecursionGuardViolation(QName),

    /// A proxy resolved to a record of a different kind than expected
    #[error("type '{name}' was expected to be {expected} but resolved to {found}")]
    TypeMismatch {
        /// Name of the proxied type
        name: QName,
        /// Kind the proxy was created for
        expected: TypeTag,
        /// Kind found in the cache
        found: TypeTag,
    },

    /// A proxy outlived the cache it resolves against
    #[error("type cache holding '{0}' has been released")]
    CacheReleased(QName),

    /// Name error (invalid NCName or QName text)
    #[error("name error: {0}")]
    Name(String),

    /// Namespace error (unknown prefix)
    #[error("namespace error: {0}")]
    Namespace(String),
}

impl Error {
    /// The qualified name the failure is about, if any
    pub fn name(&self) -> Option<&QName> {
        match self {
            Error::NotFound(name)
            | Error::MissingTypeDefinition(name)
            | Error::RecursionGuardViolation(name)
            | Error::CacheReleased(name) => Some(name),
            Error::TypeMismatch { name, .. } => Some(name),
            Error::Name(_) | Error::Namespace(_) => None,
        }
    }

    /// Check if this is a not-found failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
