use std::time::Instant;

use super::confidence::ConfidenceGate;
use super::normalizer::TermNormalizer;
use super::ranker::rank;
use super::rules::RuleTable;
use super::scorer::score;
use super::types::{
    Diagnosis, MatchType, NoMatchReason, PatternMatch, RankedCandidate, ResolvedTerm,
};
use super::DiagnosisError;
use crate::config::{ConfigError, EngineConfig};
use crate::vocabulary::{SnapshotHandle, VocabularyLookup};

/// Runs the matching pipeline against a vocabulary lookup.
///
/// Holds only configuration; every call reads the lookup it is given and
/// keeps no state between requests.
#[derive(Debug, Clone)]
pub struct DiagnosisEngine {
    config: EngineConfig,
    rules: RuleTable,
    normalizer: TermNormalizer,
    gate: ConfidenceGate,
}

impl DiagnosisEngine {
    pub fn new(config: EngineConfig, rules: RuleTable) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            normalizer: TermNormalizer::new(config.fuzzy_threshold),
            gate: ConfidenceGate::new(config.low_confidence_threshold),
            config,
            rules,
        })
    }

    /// Default tunables with the builtin override rules.
    pub fn with_defaults() -> Self {
        let config = EngineConfig::default();
        Self {
            normalizer: TermNormalizer::new(config.fuzzy_threshold),
            gate: ConfidenceGate::new(config.low_confidence_threshold),
            config,
            rules: RuleTable::builtin(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Diagnose against whatever snapshot the handle currently holds.
    ///
    /// The snapshot is pinned for the whole request.
    pub fn diagnose_current(
        &self,
        handle: &SnapshotHandle,
        raw_terms: &[String],
    ) -> Result<Diagnosis, DiagnosisError> {
        let snapshot = handle.current()?;
        self.diagnose(snapshot.as_ref(), raw_terms)
    }

    /// Map raw symptom terms to ranked candidate diseases.
    pub fn diagnose(
        &self,
        lookup: &dyn VocabularyLookup,
        raw_terms: &[String],
    ) -> Result<Diagnosis, DiagnosisError> {
        if raw_terms.is_empty() {
            return Err(DiagnosisError::EmptyInput);
        }
        let start = Instant::now();

        // Overrides see the raw input and short-circuit everything else.
        if let Some(pattern) = self.rules.evaluate(raw_terms, lookup)? {
            return Ok(pattern_result(pattern, elapsed_ms(start)));
        }

        let vocabulary = lookup.canonical_symptoms()?;
        let normalized = self.normalizer.normalize(raw_terms, &vocabulary);
        tracing::debug!(
            raw = raw_terms.len(),
            resolved = normalized.resolved.len(),
            unresolved = normalized.unresolved.len(),
            "Input normalized"
        );

        if normalized.is_empty() {
            tracing::info!(
                unresolved = normalized.unresolved.len(),
                "No input term matched the vocabulary"
            );
            return Ok(no_match(
                NoMatchReason::NoVocabularyMatch,
                normalized.resolved,
                normalized.unresolved,
                elapsed_ms(start),
            ));
        }

        let scored = score(&normalized.canonical_set(), lookup)?;
        if scored.is_empty() {
            tracing::info!(
                resolved = normalized.resolved.len(),
                "Resolved terms have no associated diseases"
            );
            return Ok(no_match(
                NoMatchReason::NoCandidateDiseases,
                normalized.resolved,
                normalized.unresolved,
                elapsed_ms(start),
            ));
        }

        let total_candidates = scored.len();
        let mut ranked_candidates = Vec::with_capacity(self.config.max_candidates);
        for result in rank(scored, self.config.max_candidates) {
            match lookup.disease(&result.disease_id)? {
                Some(disease) => {
                    ranked_candidates.push(RankedCandidate::from_match(result, disease.name_en))
                }
                None => tracing::warn!(
                    disease_id = %result.disease_id,
                    "Scored disease missing from vocabulary, dropping candidate"
                ),
            }
        }

        let best = ranked_candidates
            .first()
            .map_or(0.0, |c| c.coverage_percentage);
        let confidence = self.gate.classify(best);
        let processing_time_ms = elapsed_ms(start);

        tracing::info!(
            candidates = total_candidates,
            returned = ranked_candidates.len(),
            best_match = best,
            confidence = confidence.as_str(),
            processing_ms = processing_time_ms,
            "Diagnosis complete"
        );

        Ok(Diagnosis {
            match_type: MatchType::Scored,
            confidence: Some(confidence),
            ranked_candidates,
            unresolved_input_terms: normalized.unresolved,
            resolved_terms: normalized.resolved,
            pattern: None,
            no_match_reason: None,
            total_candidates,
            external_fallback: confidence.needs_external_lookup(),
            processing_time_ms,
        })
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

fn pattern_result(pattern: PatternMatch, processing_time_ms: u64) -> Diagnosis {
    Diagnosis {
        match_type: MatchType::Pattern,
        confidence: None,
        ranked_candidates: Vec::new(),
        unresolved_input_terms: Vec::new(),
        resolved_terms: Vec::new(),
        pattern: Some(pattern),
        no_match_reason: None,
        total_candidates: 0,
        external_fallback: false,
        processing_time_ms,
    }
}

fn no_match(
    reason: NoMatchReason,
    resolved_terms: Vec<ResolvedTerm>,
    unresolved_input_terms: Vec<String>,
    processing_time_ms: u64,
) -> Diagnosis {
    Diagnosis {
        match_type: MatchType::None,
        confidence: None,
        ranked_candidates: Vec::new(),
        unresolved_input_terms,
        resolved_terms,
        pattern: None,
        no_match_reason: Some(reason),
        total_candidates: 0,
        external_fallback: true,
        processing_time_ms,
    }
}
