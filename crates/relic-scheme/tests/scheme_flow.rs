//! Scheme lifecycle against in-memory collaborators
//!
//! Exercises the create → pending-signature → bound state machine, the
//! validation failures, and the idempotent signing retry.

use relic_catalog::{MemoryCatalog, ResourceFixture, VersionFixture};
use relic_core::{ContractBinding, PolicyId, ReleaseId, RelicError, ResourceId, UserId};
use relic_scheme::{
    compute_coverage, generate_scheme_id, CountingSigner, MemorySchemeStore, Release,
    ReleaseSchemeResolver, ResolveDeclaration, SchemeStatus,
};
use semver::Version;

fn catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    catalog.register(
        ResourceFixture::new("novel")
            .resource_type("markdown")
            .version(VersionFixture::new("1.0.0").dependency("font", "^1.0.0").resolve("font")),
    );
    catalog.register(
        ResourceFixture::new("font")
            .resource_type("font")
            .version(VersionFixture::new("1.1.0")),
    );
    catalog
}

fn release(latest: Option<(u64, u64, u64)>) -> Release {
    Release {
        release_id: ReleaseId::from("rel-1"),
        release_name: "owner/novel-release".to_string(),
        resource_type: "markdown".to_string(),
        user_id: UserId(1),
        resource_versions: Vec::new(),
        latest_version: latest.map(|(major, minor, patch)| Version::new(major, minor, patch)),
    }
}

fn declaration(resource_id: &str) -> ResolveDeclaration {
    ResolveDeclaration {
        resource_id: ResourceId::from(resource_id),
        contracts: vec![ContractBinding {
            policy_id: PolicyId::from("pol-1"),
            contract_id: None,
        }],
    }
}

async fn novel_resource(catalog: &MemoryCatalog) -> relic_core::Resource {
    use relic_catalog::ResourceCatalog;
    catalog
        .find_resource_by_id(&ResourceId::from("novel"))
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn create_persists_scheme_and_binds_contracts() {
    let catalog = catalog();
    let store = MemorySchemeStore::new();
    let signer = CountingSigner::new();
    let resolver = ReleaseSchemeResolver::new(catalog.clone(), store.clone(), signer.clone());

    let resource = novel_resource(&catalog).await;
    let scheme = resolver
        .create_release_scheme(&release(None), &resource, "1.0.0", vec![declaration("font")])
        .await
        .unwrap();

    assert_eq!(
        scheme.scheme_id,
        generate_scheme_id(&ReleaseId::from("rel-1"), &Version::new(1, 0, 0))
    );
    assert_eq!(scheme.status(), SchemeStatus::Bound);
    assert_eq!(signer.invocations(), 1);

    let coverage = compute_coverage(&[ResourceId::from("font")], &scheme);
    assert_eq!(coverage.statement_coverage_rate, 100);
    assert_eq!(coverage.contract_coverage_rate, 100);
}

#[tokio::test]
async fn create_rejects_version_not_greater_than_latest() {
    let catalog = catalog();
    let resolver =
        ReleaseSchemeResolver::new(catalog.clone(), MemorySchemeStore::new(), CountingSigner::new());
    let resource = novel_resource(&catalog).await;

    let err = resolver
        .create_release_scheme(
            &release(Some((1, 0, 0))),
            &resource,
            "1.0.0",
            vec![declaration("font")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RelicError::Argument { .. }));

    // strictly greater succeeds
    resolver
        .create_release_scheme(
            &release(Some((1, 0, 0))),
            &resource,
            "2.0.0",
            vec![declaration("font")],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn create_rejects_self_resolution() {
    let catalog = catalog();
    let resolver =
        ReleaseSchemeResolver::new(catalog.clone(), MemorySchemeStore::new(), CountingSigner::new());
    let resource = novel_resource(&catalog).await;

    let err = resolver
        .create_release_scheme(&release(None), &resource, "1.0.0", vec![declaration("novel")])
        .await
        .unwrap_err();
    assert!(matches!(err, RelicError::Argument { .. }));
}

#[tokio::test]
async fn create_rejects_resource_type_mismatch() {
    let catalog = catalog();
    let resolver =
        ReleaseSchemeResolver::new(catalog.clone(), MemorySchemeStore::new(), CountingSigner::new());
    let resource = novel_resource(&catalog).await;

    let mut wrong_type = release(None);
    wrong_type.resource_type = "audio".to_string();
    let err = resolver
        .create_release_scheme(&wrong_type, &resource, "1.0.0", vec![declaration("font")])
        .await
        .unwrap_err();
    assert!(matches!(err, RelicError::Argument { .. }));
}

#[tokio::test]
async fn retry_on_fully_bound_scheme_skips_the_signer() {
    let catalog = catalog();
    let store = MemorySchemeStore::new();
    let signer = CountingSigner::new();
    let resolver = ReleaseSchemeResolver::new(catalog.clone(), store.clone(), signer.clone());
    let resource = novel_resource(&catalog).await;

    let created = resolver
        .create_release_scheme(&release(None), &resource, "1.0.0", vec![declaration("font")])
        .await
        .unwrap();
    assert!(created.is_fully_bound());
    assert_eq!(signer.invocations(), 1);

    let retried = resolver
        .retry_sign_contracts(&ReleaseId::from("rel-1"), "1.0.0")
        .await
        .unwrap();
    assert_eq!(retried, created);
    // signer untouched by the no-op retry
    assert_eq!(signer.invocations(), 1);
}

#[tokio::test]
async fn retry_signs_when_contracts_are_still_unbound() {
    let catalog = catalog();
    let store = MemorySchemeStore::new();
    let signer = CountingSigner::new();
    let resolver = ReleaseSchemeResolver::new(catalog.clone(), store.clone(), signer.clone());
    let resource = novel_resource(&catalog).await;

    resolver
        .create_release_scheme(&release(None), &resource, "1.0.0", vec![declaration("font")])
        .await
        .unwrap();

    // An update wipes the bound contracts back to declared-only entries.
    let mut updated_release = release(None);
    updated_release.resource_versions.push(relic_scheme::ReleaseVersion {
        resource_id: ResourceId::from("novel"),
        version: Version::new(1, 0, 0),
        version_id: relic_core::VersionId::from("novel@1.0.0"),
    });
    let updated = resolver
        .update_release_scheme(&updated_release, "1.0.0", vec![declaration("font")])
        .await
        .unwrap();
    assert_eq!(updated.status(), SchemeStatus::PendingSignature);

    let retried = resolver
        .retry_sign_contracts(&ReleaseId::from("rel-1"), "1.0.0")
        .await
        .unwrap();
    assert_eq!(retried.status(), SchemeStatus::Bound);
    assert_eq!(signer.invocations(), 2);
}

#[tokio::test]
async fn update_requires_an_existing_release_version() {
    let catalog = catalog();
    let resolver =
        ReleaseSchemeResolver::new(catalog.clone(), MemorySchemeStore::new(), CountingSigner::new());

    let err = resolver
        .update_release_scheme(&release(None), "9.9.9", vec![declaration("font")])
        .await
        .unwrap_err();
    assert!(matches!(err, RelicError::Argument { .. }));
}

#[tokio::test]
async fn retry_on_unknown_scheme_reports_not_found() {
    let catalog = catalog();
    let resolver =
        ReleaseSchemeResolver::new(catalog.clone(), MemorySchemeStore::new(), CountingSigner::new());

    let err = resolver
        .retry_sign_contracts(&ReleaseId::from("rel-ghost"), "1.0.0")
        .await
        .unwrap_err();
    assert!(matches!(err, RelicError::NotFound { .. }));
}

#[tokio::test]
async fn scheme_id_survives_update() {
    let catalog = catalog();
    let store = MemorySchemeStore::new();
    let resolver =
        ReleaseSchemeResolver::new(catalog.clone(), store.clone(), CountingSigner::new());
    let resource = novel_resource(&catalog).await;

    let created = resolver
        .create_release_scheme(&release(None), &resource, "1.0.0", vec![declaration("font")])
        .await
        .unwrap();

    let mut updated_release = release(None);
    updated_release.resource_versions.push(relic_scheme::ReleaseVersion {
        resource_id: ResourceId::from("novel"),
        version: Version::new(1, 0, 0),
        version_id: relic_core::VersionId::from("novel@1.0.0"),
    });
    let updated = resolver
        .update_release_scheme(&updated_release, "1.0.0", vec![declaration("font")])
        .await
        .unwrap();
    assert_eq!(updated.scheme_id, created.scheme_id);
}
