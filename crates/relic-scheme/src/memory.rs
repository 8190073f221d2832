//! In-memory store and signer fixtures
//!
//! Back the scheme tests the same way `MemoryCatalog` backs the resolver
//! tests. `CountingSigner` records how often the signing workflow was
//! invoked so idempotency tests can assert it stayed untouched.

use crate::scheme::{ReleaseScheme, ResolveDeclaration};
use crate::{ContractSigner, SchemeStore};
use async_trait::async_trait;
use chrono::Utc;
use relic_core::{ContractId, ReleaseId, RelicError, Result, SchemeId};
use relic_resolver::AuthTreeNode;
use semver::Version;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// HashMap-backed scheme store.
///
/// Clones share state, so a test can keep a handle after moving the store
/// into a resolver.
#[derive(Debug, Default, Clone)]
pub struct MemorySchemeStore {
    schemes: Arc<RwLock<HashMap<SchemeId, ReleaseScheme>>>,
}

impl MemorySchemeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchemeStore for MemorySchemeStore {
    async fn insert(&self, scheme: ReleaseScheme) -> Result<ReleaseScheme> {
        self.schemes
            .write()
            .await
            .insert(scheme.scheme_id.clone(), scheme.clone());
        Ok(scheme)
    }

    async fn find_by_release_and_version(
        &self,
        release_id: &ReleaseId,
        version: &Version,
    ) -> Result<Option<ReleaseScheme>> {
        Ok(self
            .schemes
            .read()
            .await
            .values()
            .find(|s| &s.release_id == release_id && &s.version == version)
            .cloned())
    }

    async fn update_resolve_list(
        &self,
        scheme_id: &SchemeId,
        resolve_releases: Vec<ResolveDeclaration>,
    ) -> Result<ReleaseScheme> {
        let mut schemes = self.schemes.write().await;
        let scheme = schemes
            .get_mut(scheme_id)
            .ok_or_else(|| RelicError::not_found(format!("scheme {scheme_id} not found")))?;
        scheme.resolve_releases = resolve_releases;
        scheme.update_date = Utc::now();
        Ok(scheme.clone())
    }
}

/// Signer fixture that binds every unbound contract and counts invocations.
///
/// Clones share the counter.
#[derive(Debug, Default, Clone)]
pub struct CountingSigner {
    invocations: Arc<AtomicUsize>,
}

impl CountingSigner {
    /// Create a signer with a zeroed invocation counter
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `sign_and_bind` has run
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContractSigner for CountingSigner {
    async fn sign_and_bind(
        &self,
        scheme: &ReleaseScheme,
        _auth_tree: &[AuthTreeNode],
    ) -> Result<ReleaseScheme> {
        let call = self.invocations.fetch_add(1, Ordering::SeqCst);
        let mut signed = scheme.clone();
        for (entry_index, entry) in signed.resolve_releases.iter_mut().enumerate() {
            for (binding_index, binding) in entry.contracts.iter_mut().enumerate() {
                if binding.contract_id.is_none() {
                    binding.contract_id = Some(ContractId::new(format!(
                        "contract-{call}-{entry_index}-{binding_index}"
                    )));
                }
            }
        }
        signed.update_date = Utc::now();
        Ok(signed)
    }
}
