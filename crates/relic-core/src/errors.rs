//! Unified error system for Relic
//!
//! One crate-wide error enum shared by the catalog, resolver, and scheme
//! layers. The variants mirror the failure taxonomy of the system: caller
//! input (`Argument`), broken catalog graph (`Resolution`), missing entities
//! (`NotFound`), repository failures (`Catalog`), and everything else
//! (`Internal`).

use serde::{Deserialize, Serialize};

/// Unified error type for all Relic operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RelicError {
    /// Caller-supplied data failed shape or business validation.
    ///
    /// Never retried automatically; always reported back to the caller.
    #[error("Invalid argument: {message}")]
    Argument {
        /// Description of the failed validation
        message: String,
    },

    /// The catalog's dependency graph cannot be resolved.
    ///
    /// A version range with no satisfying candidate, or a dangling
    /// resource/version reference. Fatal to the in-flight tree build: no
    /// partial trees are ever returned.
    #[error("Resolution failed: {message}")]
    Resolution {
        /// Description of the unresolvable edge
        message: String,
    },

    /// A root entity (resource, release, scheme) does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// Description of what was not found
        message: String,
    },

    /// A catalog batch fetch failed
    #[error("Catalog error: {message}")]
    Catalog {
        /// Description of the repository failure
        message: String,
    },

    /// Internal invariant violation
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl RelicError {
    /// Create an argument validation error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument {
            message: message.into(),
        }
    }

    /// Create a resolution error
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Standard Result type for Relic operations
pub type Result<T> = std::result::Result<T, RelicError>;

impl From<semver::Error> for RelicError {
    fn from(err: semver::Error) -> Self {
        Self::argument(err.to_string())
    }
}
