//! Authorization tree derivation
//!
//! Consumes a materialized dependency tree and derives, for every node,
//! which contracted sub-resource versions satisfy the node's declared
//! resolve obligations. The search for a target resource descends into a
//! branch only while that branch's node still offers to bubble the target
//! upward; once a node opts out of upcasting it, deeper occurrences belong
//! to some other ancestor's obligation.
//!
//! Runs in three phases so the recursive walk touches the catalog zero
//! times: materialize the tree, batch-fetch every version record appearing
//! in it, then derive purely over the in-memory records.

use crate::dependency::{DependencyTreeBuilder, DependencyTreeNode, TreeBuildOptions};
use indexmap::IndexSet;
use relic_catalog::ResourceCatalog;
use relic_core::{
    ContractBinding, RelicError, Resource, ResourceId, ResourceVersion, Result, VersionId,
};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// One distinct resolved version of an authorized resource, with the
/// obligations that version passes further down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthVersionGroup {
    /// The resolved version
    pub version: Version,
    /// The matched node's own recursively derived obligations
    pub resolve_releases: Vec<AuthTreeNode>,
}

/// One declared resolve obligation and everything that satisfies it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTreeNode {
    /// The resource this obligation licenses
    pub resource_id: ResourceId,
    /// The resource's name as declared in the resolve entry
    pub resource_name: String,
    /// Contract bindings covering the obligation
    pub contracts: Vec<ContractBinding>,
    /// One group per distinct resolved version found in the subtree.
    ///
    /// Empty when nothing in the dependency graph currently satisfies the
    /// obligation — a legitimate unfilled state, not an error.
    pub versions: Vec<AuthVersionGroup>,
    /// Every distinct version range that led to this resource
    pub version_ranges: Vec<String>,
}

/// Derives authorization trees against an injected catalog
pub struct AuthorizationTreeBuilder<'a, C: ResourceCatalog> {
    catalog: &'a C,
}

impl<'a, C: ResourceCatalog> AuthorizationTreeBuilder<'a, C> {
    /// Create a builder reading from `catalog`
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Derive the authorization tree for a concrete resource version
    pub async fn build(
        &self,
        resource: &Resource,
        version: &ResourceVersion,
    ) -> Result<Vec<AuthTreeNode>> {
        let root = DependencyTreeBuilder::new(self.catalog)
            .build_rooted(resource, version, &TreeBuildOptions::default())
            .await?;

        // Flatten once: every version record the recursive walk will need.
        let mut version_ids: IndexSet<VersionId> = IndexSet::new();
        root.walk(&mut |node| {
            version_ids.insert(node.version_id.clone());
        });
        let ids: Vec<VersionId> = version_ids.into_iter().collect();
        let records: HashMap<VersionId, ResourceVersion> = self
            .catalog
            .find_resource_versions_by_ids(&ids)
            .await?
            .into_iter()
            .map(|v| (v.version_id.clone(), v))
            .collect();
        debug!(
            nodes = ids.len(),
            fetched = records.len(),
            "derived version record map for authorization walk"
        );

        derive_node(&root, &records)
    }
}

/// Derive the obligations of one tree node from pre-fetched records
fn derive_node(
    node: &DependencyTreeNode,
    records: &HashMap<VersionId, ResourceVersion>,
) -> Result<Vec<AuthTreeNode>> {
    let record = records.get(&node.version_id).ok_or_else(|| {
        RelicError::resolution(format!(
            "version record {} of {} vanished between fetch and walk",
            node.version_id, node.resource_id
        ))
    })?;

    record
        .resolve_resources
        .iter()
        .map(|entry| {
            let mut occurrences = Vec::new();
            collect_upcast_occurrences(&node.dependencies, &entry.resource_id, &mut occurrences);

            // Multiple branches may converge on the same version: collapse
            // to one group per distinct version id, but keep every distinct
            // range that reached the resource.
            let mut ranges: IndexSet<String> = IndexSet::new();
            let mut seen: HashSet<&VersionId> = HashSet::new();
            let mut versions = Vec::new();
            for &matched in &occurrences {
                if let Some(range) = &matched.version_range {
                    ranges.insert(range.to_string());
                }
                if seen.insert(&matched.version_id) {
                    versions.push(AuthVersionGroup {
                        version: matched.version.clone(),
                        resolve_releases: derive_node(matched, records)?,
                    });
                }
            }

            Ok(AuthTreeNode {
                resource_id: entry.resource_id.clone(),
                resource_name: entry.resource_name.clone(),
                contracts: entry.contracts.clone(),
                versions,
                version_ranges: ranges.into_iter().collect(),
            })
        })
        .collect()
}

/// Collect every occurrence of `target` in the subtree, stopping the
/// descent at the first node that no longer upcasts it.
///
/// Pure search over read-only node views; nothing is mutated.
fn collect_upcast_occurrences<'t>(
    dependencies: &'t [DependencyTreeNode],
    target: &ResourceId,
    occurrences: &mut Vec<&'t DependencyTreeNode>,
) {
    for node in dependencies {
        if &node.resource_id == target {
            occurrences.push(node);
        }
        if !node.upcasts(target) {
            continue;
        }
        collect_upcast_occurrences(&node.dependencies, target, occurrences);
    }
}
