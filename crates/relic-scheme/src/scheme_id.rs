//! Deterministic scheme identifier derivation
//!
//! The scheme id is a function of (release, version) only, so re-deriving
//! it is idempotent and contract binding never changes it.

use relic_core::{ReleaseId, SchemeId};
use semver::Version;
use sha2::{Digest, Sha256};

/// Derive the scheme id for one release version
pub fn generate_scheme_id(release_id: &ReleaseId, version: &Version) -> SchemeId {
    let mut hasher = Sha256::new();
    hasher.update(release_id.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(version.to_string().as_bytes());
    SchemeId::new(hex::encode(hasher.finalize()))
}
