use serde::{Deserialize, Serialize};

/// Label attached to results produced by an override rule.
pub const PATTERN_MATCH_LABEL: &str = "symptom pattern match";
/// Data-source marker for results drawn from the vocabulary graph.
pub const INTERNAL_DATA_SOURCE: &str = "internal database";

// ---------------------------------------------------------------------------
// MatchType / Confidence
// ---------------------------------------------------------------------------

/// How the final result was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// An override rule fired; scoring never ran.
    Pattern,
    /// Weighted association scoring produced the candidates.
    Scored,
    /// Nothing usable in the vocabulary graph.
    None,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Scored => "scored",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }

    /// Low confidence asks the caller to consult the external knowledge source.
    pub fn needs_external_lookup(&self) -> bool {
        *self == Self::Low
    }

    /// Low confidence asks the caller to attach the in-person evaluation advisory.
    pub fn needs_advisory(&self) -> bool {
        *self == Self::Low
    }
}

/// Why a request ended without candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoMatchReason {
    /// Every raw term was unresolved.
    NoVocabularyMatch,
    /// Terms resolved but no association touches them.
    NoCandidateDiseases,
}

// ---------------------------------------------------------------------------
// Normalization output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ResolutionMethod {
    Exact,
    Fuzzy { similarity: f64 },
}

/// One raw input term mapped to a canonical vocabulary term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTerm {
    pub raw: String,
    pub canonical: String,
    pub resolution: ResolutionMethod,
}

// ---------------------------------------------------------------------------
// Scoring output
// ---------------------------------------------------------------------------

/// Per-disease match statistics for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub disease_id: String,
    pub matching_count: usize,
    /// Canonical names of the matched symptoms, in association order.
    pub matching_symptom_names: Vec<String>,
    pub total_profile_size: usize,
    pub weight_sum: u64,
    /// `matching_count / total_profile_size * 100`, in [0, 100].
    pub coverage_percentage: f64,
}

/// A ranked, named candidate as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub disease_id: String,
    pub name: String,
    pub coverage_percentage: f64,
    pub weight_sum: u64,
    pub matching_count: usize,
    pub matching_symptom_names: Vec<String>,
    pub total_profile_size: usize,
}

impl RankedCandidate {
    pub fn from_match(result: MatchResult, name: String) -> Self {
        Self {
            disease_id: result.disease_id,
            name,
            coverage_percentage: result.coverage_percentage,
            weight_sum: result.weight_sum,
            matching_count: result.matching_count,
            matching_symptom_names: result.matching_symptom_names,
            total_profile_size: result.total_profile_size,
        }
    }
}

/// Result of an override rule short-circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub rule: String,
    pub disease_id: String,
    pub name: String,
    pub match_label: String,
    pub data_source: String,
}

// ---------------------------------------------------------------------------
// Diagnosis
// ---------------------------------------------------------------------------

/// Outcome of one `diagnose` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub match_type: MatchType,
    /// `None` when there is no ranked list to grade (pattern or no match).
    pub confidence: Option<Confidence>,
    /// At most `max_candidates`, best first.
    pub ranked_candidates: Vec<RankedCandidate>,
    pub unresolved_input_terms: Vec<String>,
    pub resolved_terms: Vec<ResolvedTerm>,
    /// Set only for `MatchType::Pattern`. A rule hit leaves `ranked_candidates`
    /// empty; the matched disease is read from here.
    pub pattern: Option<PatternMatch>,
    pub no_match_reason: Option<NoMatchReason>,
    /// Candidates scored before truncation.
    pub total_candidates: usize,
    /// The caller should also consult the external knowledge source.
    pub external_fallback: bool,
    pub processing_time_ms: u64,
}

impl Diagnosis {
    pub fn top(&self) -> Option<&RankedCandidate> {
        self.ranked_candidates.first()
    }

    /// Re-slice the bounded ranked list (e.g. top 5 for reporting).
    pub fn top_n(&self, n: usize) -> &[RankedCandidate] {
        &self.ranked_candidates[..n.min(self.ranked_candidates.len())]
    }

    /// Best disease id regardless of how it was produced: the rule target for
    /// a pattern hit, otherwise the top ranked candidate.
    pub fn best_disease_id(&self) -> Option<&str> {
        match &self.pattern {
            Some(pattern) => Some(pattern.disease_id.as_str()),
            None => self.top().map(|c| c.disease_id.as_str()),
        }
    }

    /// Coverage of the best candidate, 0 when there is none.
    pub fn best_match_percentage(&self) -> f64 {
        self.top().map_or(0.0, |c| c.coverage_percentage)
    }

    pub fn needs_advisory(&self) -> bool {
        self.confidence.is_some_and(|c| c.needs_advisory())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, coverage: f64) -> RankedCandidate {
        RankedCandidate {
            disease_id: id.into(),
            name: id.to_lowercase(),
            coverage_percentage: coverage,
            weight_sum: 1,
            matching_count: 1,
            matching_symptom_names: vec!["fever".into()],
            total_profile_size: 2,
        }
    }

    fn scored(candidates: Vec<RankedCandidate>) -> Diagnosis {
        Diagnosis {
            match_type: MatchType::Scored,
            confidence: Some(Confidence::Low),
            total_candidates: candidates.len(),
            ranked_candidates: candidates,
            unresolved_input_terms: vec![],
            resolved_terms: vec![],
            pattern: None,
            no_match_reason: None,
            external_fallback: true,
            processing_time_ms: 0,
        }
    }

    #[test]
    fn top_n_clamps_to_list_length() {
        let diagnosis = scored(vec![candidate("A", 40.0), candidate("B", 30.0)]);
        assert_eq!(diagnosis.top_n(5).len(), 2);
        assert_eq!(diagnosis.top_n(1)[0].disease_id, "A");
        assert_eq!(diagnosis.top_n(0).len(), 0);
    }

    #[test]
    fn best_match_percentage_defaults_to_zero() {
        let diagnosis = scored(vec![]);
        assert_eq!(diagnosis.best_match_percentage(), 0.0);
        assert!(diagnosis.top().is_none());
    }

    #[test]
    fn best_disease_id_prefers_pattern_target() {
        let mut diagnosis = scored(vec![candidate("A", 40.0)]);
        assert_eq!(diagnosis.best_disease_id(), Some("A"));

        diagnosis.match_type = MatchType::Pattern;
        diagnosis.ranked_candidates.clear();
        diagnosis.pattern = Some(PatternMatch {
            rule: "rule".into(),
            disease_id: "D_RULE".into(),
            name: "ruled".into(),
            match_label: PATTERN_MATCH_LABEL.into(),
            data_source: INTERNAL_DATA_SOURCE.into(),
        });
        assert_eq!(diagnosis.best_disease_id(), Some("D_RULE"));

        assert_eq!(scored(vec![]).best_disease_id(), None);
    }

    #[test]
    fn advisory_only_for_low_confidence() {
        let mut diagnosis = scored(vec![candidate("A", 40.0)]);
        assert!(diagnosis.needs_advisory());
        diagnosis.confidence = Some(Confidence::High);
        assert!(!diagnosis.needs_advisory());
        diagnosis.confidence = None;
        assert!(!diagnosis.needs_advisory());
    }

    #[test]
    fn enums_serialize_snake_case() {
        assert_eq!(serde_json::to_string(&MatchType::Pattern).unwrap(), "\"pattern\"");
        assert_eq!(serde_json::to_string(&MatchType::None).unwrap(), "\"none\"");
        assert_eq!(serde_json::to_string(&Confidence::Low).unwrap(), "\"low\"");
        assert_eq!(
            serde_json::to_string(&NoMatchReason::NoCandidateDiseases).unwrap(),
            "\"no_candidate_diseases\""
        );
    }

    #[test]
    fn resolution_method_is_tagged() {
        let json = serde_json::to_string(&ResolutionMethod::Fuzzy { similarity: 0.8 }).unwrap();
        assert_eq!(json, r#"{"method":"fuzzy","similarity":0.8}"#);
    }
}
