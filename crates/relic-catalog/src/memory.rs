//! In-memory catalog and fixture builders
//!
//! `MemoryCatalog` backs every resolver and scheme test in this workspace
//! and is exported so downstream crates can do the same. The fixture
//! builders keep test setup declarative: a resource, its versions, and the
//! dependency/upcast/resolve edges of each version in a few lines.

use crate::ResourceCatalog;
use async_trait::async_trait;
use relic_core::{
    normalize_version, parse_range, ContractBinding, ContractId, Dependency, Policy, PolicyId,
    PolicyStatus, Resource, ResourceId, ResourceRef, ResourceVersion, Result, UserId, VersionId,
};
use std::collections::HashMap;

/// HashMap-backed catalog for tests and local tooling
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    resources: HashMap<ResourceId, Resource>,
    versions: HashMap<VersionId, ResourceVersion>,
}

impl MemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed resource record
    pub fn insert_resource(&mut self, resource: Resource) {
        self.resources.insert(resource.resource_id.clone(), resource);
    }

    /// Insert a fully-formed version record
    pub fn insert_version(&mut self, version: ResourceVersion) {
        self.versions.insert(version.version_id.clone(), version);
    }

    /// Register a fixture-built resource together with its versions
    pub fn register(&mut self, fixture: ResourceFixture) {
        let (resource, versions) = fixture.build();
        self.insert_resource(resource);
        for version in versions {
            self.insert_version(version);
        }
    }

}

#[async_trait]
impl ResourceCatalog for MemoryCatalog {
    async fn find_resources_by_ids(&self, ids: &[ResourceId]) -> Result<Vec<Resource>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.resources.get(id).cloned())
            .collect())
    }

    async fn find_resource_versions_by_ids(
        &self,
        version_ids: &[VersionId],
    ) -> Result<Vec<ResourceVersion>> {
        Ok(version_ids
            .iter()
            .filter_map(|id| self.versions.get(id).cloned())
            .collect())
    }

    async fn find_resource_by_id(&self, id: &ResourceId) -> Result<Option<Resource>> {
        Ok(self.resources.get(id).cloned())
    }
}

/// Declarative builder for a resource and its version records
#[derive(Debug, Clone)]
pub struct ResourceFixture {
    resource_id: ResourceId,
    resource_name: String,
    resource_type: String,
    user_id: UserId,
    base_upcasts: Vec<ResourceId>,
    policies: Vec<Policy>,
    versions: Vec<VersionFixture>,
}

impl ResourceFixture {
    /// Start a fixture for `resource_id`, named `owner/resource_id` with
    /// type `widget` unless overridden
    pub fn new(resource_id: &str) -> Self {
        Self {
            resource_id: ResourceId::from(resource_id),
            resource_name: format!("owner/{resource_id}"),
            resource_type: "widget".to_string(),
            user_id: UserId(1),
            base_upcasts: Vec::new(),
            policies: vec![Policy {
                policy_id: PolicyId::from(format!("{resource_id}-policy").as_str()),
                policy_name: "default".to_string(),
                policy_text: "free for all".to_string(),
                status: PolicyStatus::Active,
            }],
            versions: Vec::new(),
        }
    }

    /// Override the resource type
    pub fn resource_type(mut self, resource_type: &str) -> Self {
        self.resource_type = resource_type.to_string();
        self
    }

    /// Declare `target` bubble-eligible for this resource
    pub fn upcast(mut self, target: &str) -> Self {
        self.base_upcasts.push(ResourceId::from(target));
        self
    }

    /// Add a version
    pub fn version(mut self, version: VersionFixture) -> Self {
        self.versions.push(version);
        self
    }

    fn build(self) -> (Resource, Vec<ResourceVersion>) {
        let mut resource = Resource::new(
            self.resource_id.clone(),
            self.resource_name.clone(),
            self.resource_type.clone(),
            self.user_id,
            self.policies,
        );
        resource.base_upcast_resources = self
            .base_upcasts
            .into_iter()
            .map(|id| ResourceRef {
                resource_id: id,
                resource_name: None,
            })
            .collect();

        let mut records = Vec::with_capacity(self.versions.len());
        for fixture in self.versions {
            let version_id = fixture
                .version_id
                .unwrap_or_else(|| format!("{}@{}", self.resource_id, fixture.version));
            resource
                .record_version(&fixture.version, VersionId::from(version_id.as_str()))
                .expect("fixture version must be valid and unique");
            records.push(ResourceVersion {
                resource_id: self.resource_id.clone(),
                resource_name: self.resource_name.clone(),
                version: normalize_version(&fixture.version).expect("fixture version"),
                version_id: VersionId::from(version_id.as_str()),
                file_sha1: format!("sha1-{version_id}"),
                dependencies: fixture.dependencies,
                upcast_resources: fixture
                    .upcasts
                    .into_iter()
                    .map(|id| ResourceRef {
                        resource_id: id,
                        resource_name: None,
                    })
                    .collect(),
                resolve_resources: fixture.resolves,
                description: None,
            });
        }
        (resource, records)
    }
}

/// Declarative builder for one version record
#[derive(Debug, Clone)]
pub struct VersionFixture {
    version: String,
    version_id: Option<String>,
    dependencies: Vec<Dependency>,
    upcasts: Vec<ResourceId>,
    resolves: Vec<relic_core::ResolveEntry>,
}

impl VersionFixture {
    /// Start a version fixture; the version id defaults to
    /// `<resource_id>@<version>`
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            version_id: None,
            dependencies: Vec::new(),
            upcasts: Vec::new(),
            resolves: Vec::new(),
        }
    }

    /// Override the generated version id
    pub fn version_id(mut self, id: &str) -> Self {
        self.version_id = Some(id.to_string());
        self
    }

    /// Declare a dependency edge
    pub fn dependency(mut self, resource_id: &str, range: &str) -> Self {
        self.dependencies.push(Dependency {
            resource_id: ResourceId::from(resource_id),
            version_range: parse_range(range).expect("fixture range"),
        });
        self
    }

    /// Declare an upcast edge
    pub fn upcast(mut self, resource_id: &str) -> Self {
        self.upcasts.push(ResourceId::from(resource_id));
        self
    }

    /// Declare a resolve entry with an unbound contract
    pub fn resolve(mut self, resource_id: &str) -> Self {
        self.resolves.push(relic_core::ResolveEntry {
            resource_id: ResourceId::from(resource_id),
            resource_name: format!("owner/{resource_id}"),
            contracts: vec![ContractBinding {
                policy_id: PolicyId::from(format!("{resource_id}-policy").as_str()),
                contract_id: None,
            }],
        });
        self
    }

    /// Declare a resolve entry whose contract is already bound
    pub fn resolve_bound(mut self, resource_id: &str, contract_id: &str) -> Self {
        self.resolves.push(relic_core::ResolveEntry {
            resource_id: ResourceId::from(resource_id),
            resource_name: format!("owner/{resource_id}"),
            contracts: vec![ContractBinding {
                policy_id: PolicyId::from(format!("{resource_id}-policy").as_str()),
                contract_id: Some(ContractId::from(contract_id)),
            }],
        });
        self
    }
}
