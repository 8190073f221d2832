//! Dependency tree materialization
//!
//! Expands a declared dependency list into a fully resolved tree,
//! level by level: one batch fetch for the level's resources, range
//! resolution against each resource's published versions, one batch fetch
//! for the resolved version records, then concurrent recursion into each
//! node's own dependencies. Depth is counted per tree level, never per
//! resource, so breadth does not consume the budget.

use futures::future::{try_join_all, BoxFuture};
use indexmap::IndexMap;
use relic_catalog::ResourceCatalog;
use relic_core::{
    resolve_max_satisfying, Dependency, RelicError, Resource, ResourceId, ResourceRef,
    ResourceVersion, Result, VersionId,
};
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Default recursion bound; dependency declarations deeper than this are
/// treated as pathological (or cyclic) and cut off.
pub const DEFAULT_MAX_DEPTH: u32 = 100;

/// Which optional node fields to drop during construction.
///
/// An explicit projection capability: masked fields are simply not
/// populated, rather than deleted from a finished node. `contracts` and
/// identity fields are never maskable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMask {
    /// Drop the full known-version list
    pub versions: bool,
    /// Drop the requested version range
    pub version_range: bool,
    /// Drop the upcast declaration
    pub base_upcast_resources: bool,
}

impl FieldMask {
    /// Keep every field
    pub fn none() -> Self {
        Self::default()
    }
}

/// Options for a single tree build
#[derive(Debug, Clone)]
pub struct TreeBuildOptions {
    /// Maximum tree depth to expand
    pub max_depth: u32,
    /// Projection applied to every constructed node
    pub field_mask: FieldMask,
}

impl Default for TreeBuildOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            field_mask: FieldMask::none(),
        }
    }
}

/// One resolved node of the dependency tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyTreeNode {
    /// The resolved resource
    pub resource_id: ResourceId,
    /// The resolved resource's name
    pub resource_name: String,
    /// The resolved resource's type
    pub resource_type: String,
    /// Version selected by range resolution
    pub version: Version,
    /// Identifier of the selected version record
    pub version_id: VersionId,
    /// All published versions of the resource (empty when masked)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<Version>,
    /// The range that selected this node (`None` when masked)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_range: Option<VersionReq>,
    /// The resource's bubble-eligibility declaration (empty when masked)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_upcast_resources: Vec<ResourceRef>,
    /// Resolved children, in declaration order
    pub dependencies: Vec<DependencyTreeNode>,
}

impl DependencyTreeNode {
    /// Whether this node offers to bubble `target` to its ancestors
    pub fn upcasts(&self, target: &ResourceId) -> bool {
        self.base_upcast_resources
            .iter()
            .any(|r| &r.resource_id == target)
    }

    /// Depth-first walk over this node and every descendant
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a DependencyTreeNode)) {
        visit(self);
        for child in &self.dependencies {
            child.walk(visit);
        }
    }
}

/// Builds dependency trees against an injected catalog
pub struct DependencyTreeBuilder<'a, C: ResourceCatalog> {
    catalog: &'a C,
}

impl<'a, C: ResourceCatalog> DependencyTreeBuilder<'a, C> {
    /// Create a builder reading from `catalog`
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Expand a raw dependency list into resolved trees
    pub async fn build(
        &self,
        dependencies: &[Dependency],
        options: &TreeBuildOptions,
    ) -> Result<Vec<DependencyTreeNode>> {
        debug!(
            declared = dependencies.len(),
            max_depth = options.max_depth,
            "building dependency tree"
        );
        self.expand_level(dependencies.to_vec(), 1, options).await
    }

    /// Build the tree rooted at a concrete resource version.
    ///
    /// The returned root is a synthetic node wrapping the given identity;
    /// its `dependencies` are the expansion of the version's declared
    /// dependency list. The root's range is pinned to its own version.
    pub async fn build_rooted(
        &self,
        resource: &Resource,
        version: &ResourceVersion,
        options: &TreeBuildOptions,
    ) -> Result<DependencyTreeNode> {
        let dependencies = self
            .expand_level(version.dependencies.clone(), 1, options)
            .await?;
        let mask = options.field_mask;
        let pinned = VersionReq::parse(&format!("={}", version.version))
            .map_err(|e| RelicError::internal(format!("pinning root version: {e}")))?;
        Ok(DependencyTreeNode {
            resource_id: resource.resource_id.clone(),
            resource_name: resource.resource_name.clone(),
            resource_type: resource.resource_type.clone(),
            version: version.version.clone(),
            version_id: version.version_id.clone(),
            versions: if mask.versions {
                Vec::new()
            } else {
                resource.version_numbers()
            },
            version_range: (!mask.version_range).then_some(pinned),
            base_upcast_resources: if mask.base_upcast_resources {
                Vec::new()
            } else {
                resource.base_upcast_resources.clone()
            },
            dependencies,
        })
    }

    fn expand_level<'b>(
        &'b self,
        dependencies: Vec<Dependency>,
        depth: u32,
        options: &'b TreeBuildOptions,
    ) -> BoxFuture<'b, Result<Vec<DependencyTreeNode>>> {
        Box::pin(async move {
            if dependencies.is_empty() || depth > options.max_depth {
                return Ok(Vec::new());
            }

            // Distinct resources at this level, first declaration wins.
            let mut requested: IndexMap<ResourceId, VersionReq> = IndexMap::new();
            for dependency in &dependencies {
                requested
                    .entry(dependency.resource_id.clone())
                    .or_insert_with(|| dependency.version_range.clone());
            }

            let ids: Vec<ResourceId> = requested.keys().cloned().collect();
            let resources: HashMap<ResourceId, Resource> = self
                .catalog
                .find_resources_by_ids(&ids)
                .await?
                .into_iter()
                .map(|r| (r.resource_id.clone(), r))
                .collect();

            let mut resolved: Vec<(ResourceId, VersionReq, Version, VersionId)> =
                Vec::with_capacity(requested.len());
            for (resource_id, range) in &requested {
                let resource = resources.get(resource_id).ok_or_else(|| {
                    RelicError::resolution(format!(
                        "dependency references unknown resource {resource_id}"
                    ))
                })?;
                let summary = resolve_max_satisfying(&resource.resource_versions, range)
                    .ok_or_else(|| {
                        RelicError::resolution(format!(
                            "no version of {resource_id} satisfies range '{range}'"
                        ))
                    })?;
                resolved.push((
                    resource_id.clone(),
                    range.clone(),
                    summary.version.clone(),
                    summary.version_id.clone(),
                ));
            }

            let version_ids: Vec<VersionId> =
                resolved.iter().map(|(_, _, _, id)| id.clone()).collect();
            let version_records: HashMap<VersionId, ResourceVersion> = self
                .catalog
                .find_resource_versions_by_ids(&version_ids)
                .await?
                .into_iter()
                .map(|v| (v.version_id.clone(), v))
                .collect();

            // Expand every child subtree concurrently, then reassemble in
            // the original declaration order.
            let mut child_futures = Vec::with_capacity(resolved.len());
            for (resource_id, _, _, version_id) in &resolved {
                let record = version_records.get(version_id).ok_or_else(|| {
                    RelicError::resolution(format!(
                        "version record {version_id} of {resource_id} is missing"
                    ))
                })?;
                child_futures.push(self.expand_level(
                    record.dependencies.clone(),
                    depth + 1,
                    options,
                ));
            }
            let children = try_join_all(child_futures).await?;

            let mask = options.field_mask;
            let nodes = resolved
                .into_iter()
                .zip(children)
                .map(|((resource_id, range, version, version_id), dependencies)| {
                    let resource = &resources[&resource_id];
                    DependencyTreeNode {
                        resource_id: resource.resource_id.clone(),
                        resource_name: resource.resource_name.clone(),
                        resource_type: resource.resource_type.clone(),
                        version,
                        version_id,
                        versions: if mask.versions {
                            Vec::new()
                        } else {
                            resource.version_numbers()
                        },
                        version_range: (!mask.version_range).then_some(range),
                        base_upcast_resources: if mask.base_upcast_resources {
                            Vec::new()
                        } else {
                            resource.base_upcast_resources.clone()
                        },
                        dependencies,
                    }
                })
                .collect();

            Ok(nodes)
        })
    }
}
