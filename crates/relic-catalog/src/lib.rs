//! # Relic Catalog - Read-Only Repository Abstraction
//!
//! **Purpose**: Define the catalog seam through which tree construction
//! reads resources and version records, and provide the in-memory fixture
//! implementation used by tests.
//!
//! The catalog is injected, never ambient: resolvers take `&dyn
//! ResourceCatalog` (or a generic bound) so production lookups and test
//! fixtures are interchangeable. All lookups are batched; the resolver
//! never issues per-node queries.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// In-memory catalog and fixture builders
pub mod memory;

use async_trait::async_trait;
use relic_core::{Resource, ResourceId, ResourceVersion, Result, VersionId};

pub use memory::{MemoryCatalog, ResourceFixture, VersionFixture};

/// Read-only lookup into the resource catalog.
///
/// Batch methods return only the records that exist; callers that require
/// every id to resolve must check for gaps themselves (a dangling
/// reference is a `Resolution` error at the call site, not here).
#[async_trait]
pub trait ResourceCatalog: Send + Sync {
    /// Batch-fetch resources by id. Order is not guaranteed.
    async fn find_resources_by_ids(&self, ids: &[ResourceId]) -> Result<Vec<Resource>>;

    /// Batch-fetch full version records by version id. Order is not guaranteed.
    async fn find_resource_versions_by_ids(
        &self,
        version_ids: &[VersionId],
    ) -> Result<Vec<ResourceVersion>>;

    /// Fetch a single resource, `None` when absent
    async fn find_resource_by_id(&self, id: &ResourceId) -> Result<Option<Resource>>;
}
