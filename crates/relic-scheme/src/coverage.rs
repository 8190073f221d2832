//! Coverage-rate metrics
//!
//! Derived percentages describing how completely a scheme's declared
//! obligations are backed by statements and bound contracts. Both rates are
//! 0–100 integers; an empty denominator reports 100 (nothing left
//! uncovered).

use crate::scheme::ReleaseScheme;
use relic_core::ResourceId;
use serde::{Deserialize, Serialize};

/// Coverage summary for one scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeCoverage {
    /// Fraction of bubble-eligible resources with an explicit duty statement
    pub statement_coverage_rate: u8,
    /// Fraction of resolve entries whose contracts are all bound
    pub contract_coverage_rate: u8,
    /// Number of resolve entries in the scheme
    pub depend_count: usize,
}

/// Compute coverage for `scheme` given the release's bubble-eligible
/// resources
pub fn compute_coverage(bubble_resources: &[ResourceId], scheme: &ReleaseScheme) -> SchemeCoverage {
    let stated = bubble_resources
        .iter()
        .filter(|id| {
            scheme
                .resolve_releases
                .iter()
                .any(|entry| &entry.resource_id == *id)
        })
        .count();
    let bound = scheme
        .resolve_releases
        .iter()
        .filter(|entry| entry.is_fully_bound())
        .count();

    SchemeCoverage {
        statement_coverage_rate: rate(stated, bubble_resources.len()),
        contract_coverage_rate: rate(bound, scheme.resolve_releases.len()),
        depend_count: scheme.resolve_releases.len(),
    }
}

fn rate(covered: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (covered * 100 / total) as u8
}
