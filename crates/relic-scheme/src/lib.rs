//! # Relic Scheme - Release Scheme Orchestration
//!
//! **Purpose**: Validate a proposed release version's resolve-list against
//! the formal constraints, persist the resulting scheme artifact, and drive
//! the external contract-signing workflow.
//!
//! State machine per release version:
//!
//! ```text
//! {unscheduled} --create(resolve_list)--> {pending-signature}
//! {pending-signature} --sign_and_bind--> {bound}
//! ```
//!
//! Persistence and signing are external collaborators behind the
//! [`SchemeStore`] and [`ContractSigner`] traits; the in-memory versions in
//! [`memory`] back the tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Release and scheme domain types
pub mod scheme;

/// Deterministic scheme identifier derivation
pub mod scheme_id;

/// Coverage-rate metrics
pub mod coverage;

/// Scheme lifecycle orchestration
pub mod resolver;

/// In-memory store and signer fixtures
pub mod memory;

use async_trait::async_trait;
use relic_core::{ReleaseId, Result, SchemeId};
use relic_resolver::AuthTreeNode;
use semver::Version;

pub use coverage::{compute_coverage, SchemeCoverage};
pub use memory::{CountingSigner, MemorySchemeStore};
pub use resolver::ReleaseSchemeResolver;
pub use scheme::{Release, ReleaseScheme, ReleaseVersion, ResolveDeclaration, SchemeStatus};
pub use scheme_id::generate_scheme_id;

/// Persistence seam for scheme artifacts
#[async_trait]
pub trait SchemeStore: Send + Sync {
    /// Persist a scheme, overwriting any previous row with the same id
    async fn insert(&self, scheme: ReleaseScheme) -> Result<ReleaseScheme>;

    /// Look up the scheme for one release version
    async fn find_by_release_and_version(
        &self,
        release_id: &ReleaseId,
        version: &Version,
    ) -> Result<Option<ReleaseScheme>>;

    /// Replace a scheme's resolve-list, bumping its update timestamp.
    ///
    /// The scheme id never changes on update.
    async fn update_resolve_list(
        &self,
        scheme_id: &SchemeId,
        resolve_releases: Vec<ResolveDeclaration>,
    ) -> Result<ReleaseScheme>;
}

/// External contract-signing workflow.
///
/// Receives the scheme together with the authorization tree derived for the
/// underlying resource version, and returns the scheme with contracts bound.
#[async_trait]
pub trait ContractSigner: Send + Sync {
    /// Sign and bind every unbound contract of `scheme`
    async fn sign_and_bind(
        &self,
        scheme: &ReleaseScheme,
        auth_tree: &[AuthTreeNode],
    ) -> Result<ReleaseScheme>;
}
