//! Semantic-version normalization and range resolution
//!
//! Version strings arriving from callers or the catalog may carry a leading
//! `v` or build metadata; both are stripped before any comparison. Range
//! resolution is "max satisfying": the highest candidate version matching
//! the requested range wins. Versions are unique per resource, so ties
//! cannot occur.

use crate::errors::{RelicError, Result};
use crate::resource::ResourceVersionSummary;
use semver::{BuildMetadata, Version, VersionReq};

/// Parse and normalize a version string.
///
/// Strips a leading `v`/`V` and discards build metadata, which does not
/// participate in precedence.
pub fn normalize_version(raw: &str) -> Result<Version> {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let mut version = Version::parse(stripped)
        .map_err(|e| RelicError::argument(format!("invalid version '{raw}': {e}")))?;
    version.build = BuildMetadata::EMPTY;
    Ok(version)
}

/// Parse a caller-supplied version-range expression
pub fn parse_range(raw: &str) -> Result<VersionReq> {
    VersionReq::parse(raw.trim())
        .map_err(|e| RelicError::argument(format!("invalid version range '{raw}': {e}")))
}

/// Pick the highest candidate version satisfying `range`.
///
/// Returns `None` when nothing satisfies; callers treat that as a
/// data-integrity failure, never a skip.
pub fn resolve_max_satisfying<'a>(
    candidates: &'a [ResourceVersionSummary],
    range: &VersionReq,
) -> Option<&'a ResourceVersionSummary> {
    candidates
        .iter()
        .filter(|summary| range.matches(&summary.version))
        .max_by(|a, b| a.version.cmp_precedence(&b.version))
}
