//! Scheme lifecycle orchestration
//!
//! All caller-input validation happens before any catalog or store access;
//! catalog integrity problems surface later as `Resolution` errors from the
//! tree build. Contract signing is triggered on creation and on explicit
//! retry only — the retry is idempotent and skips the signer entirely when
//! every contract is already bound.

use crate::scheme::{Release, ReleaseScheme, ResolveDeclaration};
use crate::scheme_id::generate_scheme_id;
use crate::{ContractSigner, SchemeStore};
use chrono::Utc;
use relic_catalog::ResourceCatalog;
use relic_core::{normalize_version, ReleaseId, RelicError, Resource, ResourceVersion, Result};
use relic_resolver::AuthorizationTreeBuilder;
use std::collections::HashSet;
use tracing::{debug, info};

/// Orchestrates scheme creation, updates, and signing retries
pub struct ReleaseSchemeResolver<C, S, G> {
    catalog: C,
    store: S,
    signer: G,
}

impl<C, S, G> ReleaseSchemeResolver<C, S, G>
where
    C: ResourceCatalog,
    S: SchemeStore,
    G: ContractSigner,
{
    /// Create a resolver over injected collaborators
    pub fn new(catalog: C, store: S, signer: G) -> Self {
        Self {
            catalog,
            store,
            signer,
        }
    }

    /// Validate and persist the scheme for a new release version, then
    /// trigger contract signing.
    ///
    /// Fails with an `Argument` error when the resolve-list is malformed,
    /// the resource is already published by the release, the version is not
    /// strictly greater than the release's latest, or the resource type
    /// does not match the release's.
    pub async fn create_release_scheme(
        &self,
        release: &Release,
        resource: &Resource,
        raw_version: &str,
        resolve_releases: Vec<ResolveDeclaration>,
    ) -> Result<ReleaseScheme> {
        validate_resolve_list(&resolve_releases)?;
        if resolve_releases
            .iter()
            .any(|entry| entry.resource_id == resource.resource_id)
        {
            return Err(RelicError::argument(format!(
                "resource {} cannot resolve itself",
                resource.resource_id
            )));
        }
        if release.publishes_resource(&resource.resource_id) {
            return Err(RelicError::argument(format!(
                "resource {} is already published by release {}",
                resource.resource_id, release.release_id
            )));
        }
        let version = normalize_version(raw_version)?;
        if let Some(latest) = &release.latest_version {
            if version <= *latest {
                return Err(RelicError::argument(format!(
                    "version {version} must be strictly greater than latest {latest}"
                )));
            }
        }
        if resource.resource_type != release.resource_type {
            return Err(RelicError::argument(format!(
                "resource type '{}' does not match release type '{}'",
                resource.resource_type, release.resource_type
            )));
        }

        let now = Utc::now();
        let scheme = ReleaseScheme {
            scheme_id: generate_scheme_id(&release.release_id, &version),
            release_id: release.release_id.clone(),
            resource_id: resource.resource_id.clone(),
            version,
            resolve_releases,
            create_date: now,
            update_date: now,
        };
        let stored = self.store.insert(scheme).await?;
        info!(scheme_id = %stored.scheme_id, release_id = %stored.release_id, "created release scheme");
        self.sign(stored, resource).await
    }

    /// Replace the resolve-list of an existing release version.
    ///
    /// Same validation as creation minus the greater-than check; the target
    /// version must already exist on the release. The scheme id is
    /// unchanged.
    pub async fn update_release_scheme(
        &self,
        release: &Release,
        raw_version: &str,
        resolve_releases: Vec<ResolveDeclaration>,
    ) -> Result<ReleaseScheme> {
        validate_resolve_list(&resolve_releases)?;
        let version = normalize_version(raw_version)?;
        if !release.has_version(&version) {
            return Err(RelicError::argument(format!(
                "release {} has no version {version}",
                release.release_id
            )));
        }
        let scheme = self
            .store
            .find_by_release_and_version(&release.release_id, &version)
            .await?
            .ok_or_else(|| {
                RelicError::not_found(format!(
                    "no scheme for release {} version {version}",
                    release.release_id
                ))
            })?;
        self.store
            .update_resolve_list(&scheme.scheme_id, resolve_releases)
            .await
    }

    /// Re-invoke contract signing for a scheme with unbound contracts.
    ///
    /// A no-op returning the stored scheme when everything is already
    /// bound; the signer is not consulted.
    pub async fn retry_sign_contracts(
        &self,
        release_id: &ReleaseId,
        raw_version: &str,
    ) -> Result<ReleaseScheme> {
        let version = normalize_version(raw_version)?;
        let scheme = self
            .store
            .find_by_release_and_version(release_id, &version)
            .await?
            .ok_or_else(|| {
                RelicError::not_found(format!(
                    "no scheme for release {release_id} version {version}"
                ))
            })?;
        if scheme.is_fully_bound() {
            debug!(scheme_id = %scheme.scheme_id, "all contracts bound, retry is a no-op");
            return Ok(scheme);
        }
        let resource = self
            .catalog
            .find_resource_by_id(&scheme.resource_id)
            .await?
            .ok_or_else(|| {
                RelicError::not_found(format!("resource {} not found", scheme.resource_id))
            })?;
        self.sign(scheme, &resource).await
    }

    /// Derive the authorization tree for the resource's latest version and
    /// hand it to the signing workflow, persisting the bound result.
    async fn sign(&self, scheme: ReleaseScheme, resource: &Resource) -> Result<ReleaseScheme> {
        let record = self.latest_version_record(resource).await?;
        let auth_tree = AuthorizationTreeBuilder::new(&self.catalog)
            .build(resource, &record)
            .await?;
        let signed = self.signer.sign_and_bind(&scheme, &auth_tree).await?;
        self.store.insert(signed).await
    }

    async fn latest_version_record(&self, resource: &Resource) -> Result<ResourceVersion> {
        let latest = resource.latest_version.as_ref().ok_or_else(|| {
            RelicError::argument(format!(
                "resource {} has no published versions",
                resource.resource_id
            ))
        })?;
        let summary = resource
            .resource_versions
            .iter()
            .find(|v| &v.version == latest)
            .ok_or_else(|| {
                RelicError::internal(format!(
                    "latest version {latest} missing from resource {} summaries",
                    resource.resource_id
                ))
            })?;
        let mut records = self
            .catalog
            .find_resource_versions_by_ids(std::slice::from_ref(&summary.version_id))
            .await?;
        records.pop().ok_or_else(|| {
            RelicError::resolution(format!("version record {} is missing", summary.version_id))
        })
    }
}

/// Shape validation for a caller-supplied resolve-list
fn validate_resolve_list(resolve_releases: &[ResolveDeclaration]) -> Result<()> {
    let mut seen = HashSet::new();
    for entry in resolve_releases {
        if entry.resource_id.as_str().is_empty() {
            return Err(RelicError::argument("resolve entry has an empty resource id"));
        }
        if !seen.insert(&entry.resource_id) {
            return Err(RelicError::argument(format!(
                "resolve entry for {} appears more than once",
                entry.resource_id
            )));
        }
        if entry.contracts.is_empty() {
            return Err(RelicError::argument(format!(
                "resolve entry for {} declares no contract bindings",
                entry.resource_id
            )));
        }
        for binding in &entry.contracts {
            if binding.policy_id.as_str().is_empty() {
                return Err(RelicError::argument(format!(
                    "resolve entry for {} has a binding with an empty policy id",
                    entry.resource_id
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relic_core::{ContractBinding, PolicyId, ResourceId};

    fn declaration(resource_id: &str) -> ResolveDeclaration {
        ResolveDeclaration {
            resource_id: ResourceId::from(resource_id),
            contracts: vec![ContractBinding {
                policy_id: PolicyId::from("pol-1"),
                contract_id: None,
            }],
        }
    }

    #[test]
    fn duplicate_entries_fail_shape_validation() {
        let err = validate_resolve_list(&[declaration("a"), declaration("a")]).unwrap_err();
        assert!(matches!(err, RelicError::Argument { .. }));
    }

    #[test]
    fn entries_without_contracts_fail_shape_validation() {
        let mut entry = declaration("a");
        entry.contracts.clear();
        let err = validate_resolve_list(&[entry]).unwrap_err();
        assert!(matches!(err, RelicError::Argument { .. }));
    }

    #[test]
    fn empty_list_is_valid() {
        assert!(validate_resolve_list(&[]).is_ok());
    }
}
