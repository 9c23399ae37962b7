//! Ranker: orders scored diseases and bounds the list.

use std::cmp::Ordering;

use super::types::MatchResult;

/// Descending by coverage, then by summed weight. Full ties keep input order.
pub fn rank(mut results: Vec<MatchResult>, limit: usize) -> Vec<MatchResult> {
    // `sort_by` is stable, which is what preserves insertion order on ties.
    results.sort_by(compare_desc);
    results.truncate(limit);
    results
}

fn compare_desc(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.coverage_percentage
        .total_cmp(&a.coverage_percentage)
        .then_with(|| b.weight_sum.cmp(&a.weight_sum))
}
