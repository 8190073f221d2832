//! # Relic Core - Domain Foundation
//!
//! **Purpose**: Define the release-licensing domain types, identifiers, and
//! version-resolution semantics shared by every other Relic crate.
//!
//! This crate is pure and synchronous: no I/O, no async, no catalog access.
//! - YES domain types (resources, versions, policies, resolve entries)
//! - YES semantic-version normalization and max-satisfying resolution
//! - YES the unified error type used across crates
//! - NO catalog lookups (that's `relic-catalog`)
//! - NO tree construction (that's `relic-resolver`)
//! - NO scheme persistence or signing (that's `relic-scheme`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Unified error type and result alias
pub mod errors;

/// Opaque identifier newtypes
pub mod types;

/// Resource, version, and policy domain model
pub mod resource;

/// Semantic-version normalization and range resolution
pub mod version;

pub use errors::{RelicError, Result};
pub use resource::{
    ContractBinding, Dependency, Policy, PolicyStatus, ResolveEntry, Resource, ResourceRef,
    ResourceStatus, ResourceVersion, ResourceVersionSummary,
};
pub use types::{ContractId, PolicyId, ReleaseId, ResourceId, SchemeId, UserId, VersionId};
pub use version::{normalize_version, parse_range, resolve_max_satisfying};
