//! Association Scorer: per-disease match statistics for the normalized input.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::types::MatchResult;
use super::DiagnosisError;
use crate::vocabulary::VocabularyLookup;

/// Percentage of a disease profile covered by the matches; 0 for an empty profile.
pub fn coverage_percentage(matching_count: usize, total_profile_size: usize) -> f64 {
    if total_profile_size == 0 {
        return 0.0;
    }
    (matching_count as f64 * 100.0) / total_profile_size as f64
}

/// Running totals for one disease, created on first touch.
#[derive(Debug, Default)]
struct MatchAccumulator {
    disease_id: String,
    matching_count: usize,
    weight_sum: u64,
    matching_symptom_names: Vec<String>,
}

/// Per-request accumulator arena. Entries keep first-touch order.
#[derive(Debug, Default)]
struct Accumulators {
    entries: Vec<MatchAccumulator>,
    index: HashMap<String, usize>,
}

impl Accumulators {
    fn touch(&mut self, disease_id: &str) -> &mut MatchAccumulator {
        let idx = match self.index.get(disease_id) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push(MatchAccumulator {
                    disease_id: disease_id.to_string(),
                    ..MatchAccumulator::default()
                });
                self.index.insert(disease_id.to_string(), idx);
                idx
            }
        };
        &mut self.entries[idx]
    }
}

/// Score every disease touched by the canonical terms.
///
/// Results come back in first-touch order of the association sequence.
/// Diseases with no matching association are absent.
pub fn score(
    canonical_terms: &BTreeSet<String>,
    lookup: &dyn VocabularyLookup,
) -> Result<Vec<MatchResult>, DiagnosisError> {
    let names_by_id: BTreeMap<String, String> = lookup.symptom_ids_for(canonical_terms)?;
    if names_by_id.is_empty() {
        return Ok(Vec::new());
    }

    let symptom_ids: BTreeSet<String> = names_by_id.keys().cloned().collect();
    let edges = lookup.associations_for(&symptom_ids)?;

    let mut acc = Accumulators::default();
    for edge in &edges {
        let Some(name) = names_by_id.get(&edge.symptom_id) else {
            continue;
        };
        let entry = acc.touch(&edge.disease_id);
        entry.matching_count += 1;
        entry.weight_sum += u64::from(edge.weight);
        entry.matching_symptom_names.push(name.clone());
    }

    let mut results = Vec::with_capacity(acc.entries.len());
    for entry in acc.entries {
        let total_profile_size = lookup.profile_size(&entry.disease_id)?;
        if total_profile_size == 0 || total_profile_size < entry.matching_count {
            tracing::warn!(
                disease_id = %entry.disease_id,
                profile_size = total_profile_size,
                matching = entry.matching_count,
                "Disease profile smaller than its recorded matches"
            );
            return Err(DiagnosisError::InconsistentProfile {
                disease_id: entry.disease_id,
                profile_size: total_profile_size,
                matching_count: entry.matching_count,
            });
        }

        results.push(MatchResult {
            coverage_percentage: coverage_percentage(entry.matching_count, total_profile_size),
            disease_id: entry.disease_id,
            matching_count: entry.matching_count,
            matching_symptom_names: entry.matching_symptom_names,
            total_profile_size,
            weight_sum: entry.weight_sum,
        });
    }

    Ok(results)
}
