//! Release and scheme domain types

use chrono::{DateTime, Utc};
use relic_core::{ContractBinding, ReleaseId, ResourceId, SchemeId, UserId, VersionId};
use semver::Version;
use serde::{Deserialize, Serialize};

/// One version of a release: which resource revision it publishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseVersion {
    /// The resource published at this version
    pub resource_id: ResourceId,
    /// Release version number
    pub version: Version,
    /// The resource version record behind it
    pub version_id: VersionId,
}

/// A publishable, versioned packaging of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Release identifier
    pub release_id: ReleaseId,
    /// Qualified release name
    pub release_name: String,
    /// Declared resource type; every attached resource must match
    pub resource_type: String,
    /// Owning user
    pub user_id: UserId,
    /// Published versions, oldest first
    pub resource_versions: Vec<ReleaseVersion>,
    /// Maximum published version by semver ordering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<Version>,
}

impl Release {
    /// Whether `resource_id` is already published by some version
    pub fn publishes_resource(&self, resource_id: &ResourceId) -> bool {
        self.resource_versions
            .iter()
            .any(|v| &v.resource_id == resource_id)
    }

    /// Whether `version` already exists on this release
    pub fn has_version(&self, version: &Version) -> bool {
        self.resource_versions.iter().any(|v| &v.version == version)
    }
}

/// Lifecycle state of a scheme, derived from contract completeness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemeStatus {
    /// At least one resolve entry still lacks a bound contract
    PendingSignature,
    /// Every resolve entry carries a bound contract
    Bound,
}

/// One entry of a scheme's resolve-list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveDeclaration {
    /// The resource this release takes licensing responsibility for
    pub resource_id: ResourceId,
    /// Declared contract bindings; `contract_id` absent until signed
    pub contracts: Vec<ContractBinding>,
}

impl ResolveDeclaration {
    /// Whether every contract of this entry has been bound
    pub fn is_fully_bound(&self) -> bool {
        self.contracts.iter().all(ContractBinding::is_bound)
    }
}

/// Persisted scheme artifact for one release version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseScheme {
    /// Deterministic identifier, stable across contract binding
    pub scheme_id: SchemeId,
    /// Owning release
    pub release_id: ReleaseId,
    /// The resource published at this version
    pub resource_id: ResourceId,
    /// Release version this scheme belongs to
    pub version: Version,
    /// The validated resolve-list
    pub resolve_releases: Vec<ResolveDeclaration>,
    /// Creation timestamp
    pub create_date: DateTime<Utc>,
    /// Last mutation timestamp
    pub update_date: DateTime<Utc>,
}

impl ReleaseScheme {
    /// Whether every resolve entry carries a bound contract
    pub fn is_fully_bound(&self) -> bool {
        self.resolve_releases
            .iter()
            .all(ResolveDeclaration::is_fully_bound)
    }

    /// Derived lifecycle state
    pub fn status(&self) -> SchemeStatus {
        if self.is_fully_bound() {
            SchemeStatus::Bound
        } else {
            SchemeStatus::PendingSignature
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relic_core::{ContractId, PolicyId};

    fn scheme_with(contract_id: Option<&str>) -> ReleaseScheme {
        let now = Utc::now();
        ReleaseScheme {
            scheme_id: SchemeId::from("scheme-1"),
            release_id: ReleaseId::from("rel-1"),
            resource_id: ResourceId::from("res-1"),
            version: Version::new(1, 0, 0),
            resolve_releases: vec![ResolveDeclaration {
                resource_id: ResourceId::from("res-2"),
                contracts: vec![ContractBinding {
                    policy_id: PolicyId::from("pol-1"),
                    contract_id: contract_id.map(ContractId::from),
                }],
            }],
            create_date: now,
            update_date: now,
        }
    }

    #[test]
    fn scheme_status_follows_contract_completeness() {
        assert_eq!(scheme_with(None).status(), SchemeStatus::PendingSignature);
        assert_eq!(scheme_with(Some("con-1")).status(), SchemeStatus::Bound);
    }

    #[test]
    fn empty_resolve_list_counts_as_bound() {
        let mut scheme = scheme_with(None);
        scheme.resolve_releases.clear();
        assert_eq!(scheme.status(), SchemeStatus::Bound);
    }
}
