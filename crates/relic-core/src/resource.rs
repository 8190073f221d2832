//! Resource, version, and policy domain model
//!
//! A `Resource` is the catalog entity; each `ResourceVersion` is one
//! immutable published revision of it. A version declares three kinds of
//! edges to other resources:
//!
//! - `dependencies`: structural edges (resource id + version range);
//! - `upcast_resources`: dependencies this version offers to bubble up to
//!   an ancestor instead of licensing itself;
//! - `resolve_resources`: dependencies this version takes explicit
//!   contractual responsibility for.

use crate::types::{ContractId, PolicyId, ResourceId, UserId, VersionId};
use crate::version::normalize_version;
use crate::{RelicError, Result};
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a licensing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyStatus {
    /// Drafted but not yet offered
    Draft,
    /// Offered to licensees
    Active,
    /// Withdrawn from offer
    Retired,
}

/// A licensing policy attached to a resource.
///
/// Policy text compilation is an external concern; the compiled policy is
/// referenced here only by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Identifier assigned by the policy compiler
    pub policy_id: PolicyId,
    /// Human-readable policy name
    pub policy_name: String,
    /// Raw policy text as supplied by the owner
    pub policy_text: String,
    /// Lifecycle status
    pub status: PolicyStatus,
}

/// Derived status of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    /// Missing an active policy or any published version
    #[default]
    Pending,
    /// At least one active policy and at least one version
    Active,
}

/// A bare reference to another resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// The referenced resource
    pub resource_id: ResourceId,
    /// Name of the referenced resource, when known at declaration time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
}

impl ResourceRef {
    /// Reference a resource by id only
    pub fn new(resource_id: impl Into<ResourceId>) -> Self {
        Self {
            resource_id: resource_id.into(),
            resource_name: None,
        }
    }
}

/// A structural dependency edge declared by a resource version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// The depended-upon resource
    pub resource_id: ResourceId,
    /// Requested version range, standard semver range syntax
    pub version_range: VersionReq,
}

/// Summary of one published version of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceVersionSummary {
    /// Normalized semantic version
    pub version: Version,
    /// Identifier of the full `ResourceVersion` record
    pub version_id: VersionId,
}

/// A contract binding inside a resolve entry.
///
/// `contract_id` stays `None` until the external signing workflow binds the
/// contract; the binding itself (policy reference) is declared up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractBinding {
    /// The policy segment this contract executes
    pub policy_id: PolicyId,
    /// Bound contract, absent until signed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<ContractId>,
}

impl ContractBinding {
    /// Whether the signing workflow has bound this contract
    pub fn is_bound(&self) -> bool {
        self.contract_id.is_some()
    }
}

/// A dependency this version takes contractual licensing responsibility for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveEntry {
    /// The resolved resource
    pub resource_id: ResourceId,
    /// Name of the resolved resource
    pub resource_name: String,
    /// Declared contract bindings covering this resource
    pub contracts: Vec<ContractBinding>,
}

impl ResolveEntry {
    /// Whether every declared contract has been bound
    pub fn is_fully_bound(&self) -> bool {
        self.contracts.iter().all(ContractBinding::is_bound)
    }
}

/// One immutable published revision of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceVersion {
    /// Owning resource
    pub resource_id: ResourceId,
    /// Owning resource's name
    pub resource_name: String,
    /// Normalized semantic version
    pub version: Version,
    /// Identifier of this record
    pub version_id: VersionId,
    /// Content hash of the published file
    pub file_sha1: String,
    /// Structural dependency edges
    pub dependencies: Vec<Dependency>,
    /// Dependencies offered for bubbling to ancestors
    pub upcast_resources: Vec<ResourceRef>,
    /// Dependencies this version contractually resolves
    pub resolve_resources: Vec<ResolveEntry>,
    /// Optional release notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A catalog resource: identity, policies, and its published versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Catalog identifier
    pub resource_id: ResourceId,
    /// Qualified name, `owner/name`
    pub resource_name: String,
    /// Resource type tag (e.g. `image`, `widget`, `theme`)
    pub resource_type: String,
    /// Owning user
    pub user_id: UserId,
    /// Published versions, unique by version
    pub resource_versions: Vec<ResourceVersionSummary>,
    /// Resources this resource is allowed to bubble to ancestors
    pub base_upcast_resources: Vec<ResourceRef>,
    /// Licensing policies
    pub policies: Vec<Policy>,
    /// Maximum published version by semver ordering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<Version>,
    /// Derived status
    pub status: ResourceStatus,
    /// Short introduction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    /// Cover image URLs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cover_images: Vec<String>,
    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Resource {
    /// Create a resource with no versions yet, deriving its initial status
    pub fn new(
        resource_id: impl Into<ResourceId>,
        resource_name: impl Into<String>,
        resource_type: impl Into<String>,
        user_id: UserId,
        policies: Vec<Policy>,
    ) -> Self {
        let mut resource = Self {
            resource_id: resource_id.into(),
            resource_name: resource_name.into(),
            resource_type: resource_type.into(),
            user_id,
            resource_versions: Vec::new(),
            base_upcast_resources: Vec::new(),
            policies,
            latest_version: None,
            status: ResourceStatus::Pending,
            intro: None,
            cover_images: Vec::new(),
            tags: Vec::new(),
        };
        resource.refresh_status();
        resource
    }

    /// Active iff the resource has an active policy and a published version
    pub fn derive_status(&self) -> ResourceStatus {
        let has_active_policy = self
            .policies
            .iter()
            .any(|p| p.status == PolicyStatus::Active);
        if has_active_policy && !self.resource_versions.is_empty() {
            ResourceStatus::Active
        } else {
            ResourceStatus::Pending
        }
    }

    /// Recompute `status` after a policy or version change
    pub fn refresh_status(&mut self) {
        self.status = self.derive_status();
    }

    /// Record a newly published version, keeping `latest_version` the
    /// semver maximum. Duplicate versions are rejected.
    pub fn record_version(&mut self, raw_version: &str, version_id: VersionId) -> Result<()> {
        let version = normalize_version(raw_version)?;
        if self.resource_versions.iter().any(|v| v.version == version) {
            return Err(RelicError::argument(format!(
                "resource {} already has version {version}",
                self.resource_id
            )));
        }
        match &self.latest_version {
            Some(latest) if *latest >= version => {}
            _ => self.latest_version = Some(version.clone()),
        }
        self.resource_versions
            .push(ResourceVersionSummary { version, version_id });
        self.refresh_status();
        Ok(())
    }

    /// All published version numbers, in declaration order
    pub fn version_numbers(&self) -> Vec<Version> {
        self.resource_versions
            .iter()
            .map(|v| v.version.clone())
            .collect()
    }

    /// Whether this resource declares `target` as bubble-eligible
    pub fn upcasts(&self, target: &ResourceId) -> bool {
        self.base_upcast_resources
            .iter()
            .any(|r| &r.resource_id == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_policy(id: &str) -> Policy {
        Policy {
            policy_id: PolicyId::from(id),
            policy_name: "standard".to_string(),
            policy_text: "for public use".to_string(),
            status: PolicyStatus::Active,
        }
    }

    #[test]
    fn new_resource_without_versions_is_pending() {
        let resource = Resource::new(
            "res-1",
            "alice/markdown",
            "markdown",
            UserId(1),
            vec![active_policy("pol-1")],
        );
        assert_eq!(resource.status, ResourceStatus::Pending);
    }

    #[test]
    fn recording_a_version_activates_resource_with_active_policy() {
        let mut resource = Resource::new(
            "res-1",
            "alice/markdown",
            "markdown",
            UserId(1),
            vec![active_policy("pol-1")],
        );
        resource
            .record_version("1.0.0", VersionId::from("ver-1"))
            .unwrap();
        assert_eq!(resource.status, ResourceStatus::Active);
        assert_eq!(resource.latest_version, Some(Version::new(1, 0, 0)));
    }

    #[test]
    fn resource_with_only_draft_policies_stays_pending() {
        let mut resource = Resource::new(
            "res-1",
            "alice/markdown",
            "markdown",
            UserId(1),
            vec![Policy {
                status: PolicyStatus::Draft,
                ..active_policy("pol-1")
            }],
        );
        resource
            .record_version("1.0.0", VersionId::from("ver-1"))
            .unwrap();
        assert_eq!(resource.status, ResourceStatus::Pending);
    }

    #[test]
    fn latest_version_tracks_semver_maximum_not_insertion_order() {
        let mut resource = Resource::new("res-1", "alice/lib", "widget", UserId(1), vec![]);
        resource
            .record_version("2.0.0", VersionId::from("ver-2"))
            .unwrap();
        resource
            .record_version("1.5.0", VersionId::from("ver-1"))
            .unwrap();
        assert_eq!(resource.latest_version, Some(Version::new(2, 0, 0)));
    }

    #[test]
    fn duplicate_versions_are_rejected() {
        let mut resource = Resource::new("res-1", "alice/lib", "widget", UserId(1), vec![]);
        resource
            .record_version("1.0.0", VersionId::from("ver-1"))
            .unwrap();
        let err = resource
            .record_version("v1.0.0", VersionId::from("ver-dup"))
            .unwrap_err();
        assert!(matches!(err, RelicError::Argument { .. }));
    }

    #[test]
    fn fully_bound_resolve_entry_requires_every_contract() {
        let entry = ResolveEntry {
            resource_id: ResourceId::from("res-2"),
            resource_name: "bob/font".to_string(),
            contracts: vec![
                ContractBinding {
                    policy_id: PolicyId::from("pol-1"),
                    contract_id: Some(ContractId::from("con-1")),
                },
                ContractBinding {
                    policy_id: PolicyId::from("pol-2"),
                    contract_id: None,
                },
            ],
        };
        assert!(!entry.is_fully_bound());
    }
}
