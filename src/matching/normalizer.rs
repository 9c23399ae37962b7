//! Term Normalizer: raw input term to at most one canonical vocabulary term.
//!
//! Exact (case-sensitive) lookup first. Otherwise the single most similar
//! canonical name by normalized Levenshtein similarity, accepted only at or
//! above the configured threshold. Equal scores resolve to the earliest name
//! in vocabulary order.

use std::collections::{BTreeSet, HashSet};

use super::types::{ResolutionMethod, ResolvedTerm};

/// Normalizer output: resolved terms and raw terms nothing matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedInput {
    pub resolved: Vec<ResolvedTerm>,
    pub unresolved: Vec<String>,
}

impl NormalizedInput {
    /// Distinct canonical terms that go on to scoring.
    pub fn canonical_set(&self) -> BTreeSet<String> {
        self.resolved.iter().map(|t| t.canonical.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// Similarity ratio in [0, 1]; 1 means identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

#[derive(Debug, Clone)]
pub struct TermNormalizer {
    threshold: f64,
}

impl TermNormalizer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Resolve every distinct raw term against `vocabulary`.
    ///
    /// Repeated raw terms are processed once, at their first position.
    pub fn normalize(&self, raw_terms: &[String], vocabulary: &[String]) -> NormalizedInput {
        let exact: HashSet<&str> = vocabulary.iter().map(String::as_str).collect();
        let mut seen: HashSet<&str> = HashSet::with_capacity(raw_terms.len());
        let mut out = NormalizedInput::default();

        for raw in raw_terms {
            if !seen.insert(raw.as_str()) {
                continue;
            }

            if exact.contains(raw.as_str()) {
                out.resolved.push(ResolvedTerm {
                    raw: raw.clone(),
                    canonical: raw.clone(),
                    resolution: ResolutionMethod::Exact,
                });
                continue;
            }

            match self.best_fuzzy(raw, vocabulary) {
                Some((canonical, score)) => {
                    tracing::info!(
                        raw = %raw,
                        canonical = %canonical,
                        similarity = score,
                        "Resolved symptom by fuzzy match"
                    );
                    out.resolved.push(ResolvedTerm {
                        raw: raw.clone(),
                        canonical: canonical.to_string(),
                        resolution: ResolutionMethod::Fuzzy { similarity: score },
                    });
                }
                None => {
                    tracing::debug!(raw = %raw, "No vocabulary term close enough");
                    out.unresolved.push(raw.clone());
                }
            }
        }

        out
    }

    /// Best candidate at or above threshold. Strict `>` keeps the first of equals.
    fn best_fuzzy<'v>(&self, raw: &str, vocabulary: &'v [String]) -> Option<(&'v str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for name in vocabulary {
            let score = similarity(raw, name);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((name.as_str(), score));
            }
        }
        best.filter(|(_, score)| *score >= self.threshold)
    }
}
