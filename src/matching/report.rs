//! Report assembly on top of a `Diagnosis`: disease details for the top
//! candidates, the low-confidence advisory, and the external lookup request.
//!
//! The external knowledge service itself lives outside this crate. Callers
//! plug it in through [`ExternalKnowledge`].

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::confidence::IN_PERSON_ADVISORY;
use super::types::{
    Confidence, Diagnosis, MatchType, NoMatchReason, PatternMatch, RankedCandidate,
    INTERNAL_DATA_SOURCE,
};
use crate::vocabulary::VocabularySnapshot;

/// Why the caller should consult the external knowledge source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FallbackReason {
    NoVocabularyMatch,
    NoCandidateDiseases,
    LowConfidence { best_match_percentage: f64 },
}

/// What gets handed to the external knowledge source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLookupRequest {
    /// Raw input terms, uncorrected.
    pub symptoms: Vec<String>,
    #[serde(flatten)]
    pub reason: FallbackReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalFinding {
    pub information: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExternalAnalysis {
    Found(ExternalFinding),
    Failed { error: String },
}

#[derive(Error, Debug)]
pub enum ExternalKnowledgeError {
    #[error("External knowledge source unavailable: {0}")]
    Unavailable(String),

    #[error("External lookup failed: {0}")]
    Lookup(String),
}

/// Seam for the external knowledge service. Timeouts and retries are the
/// implementation's concern.
pub trait ExternalKnowledge {
    fn lookup(&self, request: &ExternalLookupRequest)
        -> Result<ExternalFinding, ExternalKnowledgeError>;
}

/// One reported candidate with its disease details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDetail {
    pub rank: usize,
    pub disease_id: String,
    pub name_en: String,
    pub name_local: Option<String>,
    pub description: Option<String>,
    pub specialization: Option<String>,
    pub matching_count: usize,
    pub matching_symptom_names: Vec<String>,
    pub total_profile_size: usize,
    /// Full symptom profile of the disease, in graph order.
    pub all_symptom_names: Vec<String>,
    pub weight_sum: u64,
    /// Coverage rounded to two decimals.
    pub match_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub generated_at: NaiveDateTime,
    pub match_type: MatchType,
    pub confidence: Option<Confidence>,
    pub input_symptoms: Vec<String>,
    pub found_in_database: Vec<String>,
    pub not_found_in_database: Vec<String>,
    pub total_diseases_found: usize,
    pub top_diseases: Vec<CandidateDetail>,
    pub pattern: Option<PatternMatch>,
    pub no_match_reason: Option<NoMatchReason>,
    pub data_source: String,
    pub best_match_percentage: f64,
    pub advisory: Option<String>,
    pub external_lookup: Option<ExternalLookupRequest>,
    pub external_analysis: Option<ExternalAnalysis>,
}

impl DiagnosisReport {
    pub fn needs_external_lookup(&self) -> bool {
        self.external_lookup.is_some()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn fallback_reason(diagnosis: &Diagnosis, best_match_percentage: f64) -> Option<FallbackReason> {
    if !diagnosis.external_fallback {
        return None;
    }
    Some(match diagnosis.no_match_reason {
        Some(NoMatchReason::NoVocabularyMatch) => FallbackReason::NoVocabularyMatch,
        Some(NoMatchReason::NoCandidateDiseases) => FallbackReason::NoCandidateDiseases,
        None => FallbackReason::LowConfidence {
            best_match_percentage,
        },
    })
}

fn candidate_detail(
    rank: usize,
    candidate: &RankedCandidate,
    snapshot: &VocabularySnapshot,
) -> CandidateDetail {
    let disease = snapshot.disease_by_id(&candidate.disease_id);
    if disease.is_none() {
        tracing::warn!(
            disease_id = %candidate.disease_id,
            "Candidate missing from report snapshot, details left empty"
        );
    }

    CandidateDetail {
        rank,
        disease_id: candidate.disease_id.clone(),
        name_en: candidate.name.clone(),
        name_local: disease.and_then(|d| d.name_local.clone()),
        description: disease.and_then(|d| d.description.clone()),
        specialization: disease.and_then(|d| d.specialization.clone()),
        matching_count: candidate.matching_count,
        matching_symptom_names: candidate.matching_symptom_names.clone(),
        total_profile_size: candidate.total_profile_size,
        all_symptom_names: snapshot
            .profile_names(&candidate.disease_id)
            .into_iter()
            .map(str::to_string)
            .collect(),
        weight_sum: candidate.weight_sum,
        match_percentage: round2(candidate.coverage_percentage),
    }
}

/// Raw terms split into (found, not found).
///
/// Pattern hits skip normalization, so their split is an exact vocabulary
/// check; otherwise it follows the normalizer's unresolved list.
fn split_by_vocabulary(
    diagnosis: &Diagnosis,
    raw_terms: &[String],
    snapshot: &VocabularySnapshot,
) -> (Vec<String>, Vec<String>) {
    if diagnosis.match_type == MatchType::Pattern {
        return raw_terms
            .iter()
            .cloned()
            .partition(|t| snapshot.symptom_by_name(t).is_some());
    }

    let unresolved: HashSet<&str> = diagnosis
        .unresolved_input_terms
        .iter()
        .map(String::as_str)
        .collect();
    let found = raw_terms
        .iter()
        .filter(|t| !unresolved.contains(t.as_str()))
        .cloned()
        .collect();
    (found, diagnosis.unresolved_input_terms.clone())
}

/// Assemble the caller-facing report for one diagnosis.
///
/// `raw_terms` is the same input that was passed to `diagnose`.
pub fn build_report(
    diagnosis: &Diagnosis,
    raw_terms: &[String],
    snapshot: &VocabularySnapshot,
    report_top: usize,
) -> DiagnosisReport {
    let (found_in_database, not_found_in_database) =
        split_by_vocabulary(diagnosis, raw_terms, snapshot);

    let top_diseases: Vec<CandidateDetail> = diagnosis
        .top_n(report_top)
        .iter()
        .enumerate()
        .map(|(i, c)| candidate_detail(i + 1, c, snapshot))
        .collect();

    let best_match_percentage = round2(diagnosis.best_match_percentage());
    let external_lookup =
        fallback_reason(diagnosis, best_match_percentage).map(|reason| ExternalLookupRequest {
            symptoms: raw_terms.to_vec(),
            reason,
        });

    DiagnosisReport {
        generated_at: chrono::Local::now().naive_local(),
        match_type: diagnosis.match_type,
        confidence: diagnosis.confidence,
        input_symptoms: raw_terms.to_vec(),
        found_in_database,
        not_found_in_database,
        total_diseases_found: diagnosis.total_candidates,
        top_diseases,
        pattern: diagnosis.pattern.clone(),
        no_match_reason: diagnosis.no_match_reason,
        data_source: INTERNAL_DATA_SOURCE.to_string(),
        best_match_percentage,
        advisory: diagnosis
            .needs_advisory()
            .then(|| IN_PERSON_ADVISORY.to_string()),
        external_lookup,
        external_analysis: None,
    }
}

/// Consult the external source if the report asks for it.
///
/// A failed lookup is recorded on the report, not propagated.
pub fn attach_external(report: &mut DiagnosisReport, source: &dyn ExternalKnowledge) {
    let Some(request) = &report.external_lookup else {
        return;
    };

    let analysis = match source.lookup(request) {
        Ok(finding) => {
            tracing::info!(source = %finding.source, "External knowledge lookup succeeded");
            ExternalAnalysis::Found(finding)
        }
        Err(e) => {
            tracing::error!(error = %e, "External knowledge lookup failed");
            ExternalAnalysis::Failed {
                error: e.to_string(),
            }
        }
    };
    report.external_analysis = Some(analysis);
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::matching::DiagnosisEngine;

    fn raw(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|s| s.to_string()).collect()
    }

    fn report_for(terms: &[&str]) -> DiagnosisReport {
        let snapshot = VocabularySnapshot::load_test();
        let engine = DiagnosisEngine::with_defaults();
        let input = raw(terms);
        let diagnosis = engine.diagnose(&snapshot, &input).unwrap();
        build_report(&diagnosis, &input, &snapshot, engine.config().report_top)
    }

    struct StubSource {
        calls: Cell<usize>,
        fail: bool,
    }

    impl StubSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: Cell::new(0),
                fail,
            }
        }
    }

    impl ExternalKnowledge for StubSource {
        fn lookup(
            &self,
            request: &ExternalLookupRequest,
        ) -> Result<ExternalFinding, ExternalKnowledgeError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ExternalKnowledgeError::Unavailable("timed out".into()));
            }
            Ok(ExternalFinding {
                information: format!("looked up {}", request.symptoms.join(", ")),
                source: "stub".into(),
            })
        }
    }

    #[test]
    fn high_confidence_report() {
        let report = report_for(&["fever", "cough", "sore throat"]);

        assert_eq!(report.match_type, MatchType::Scored);
        assert_eq!(report.confidence, Some(Confidence::High));
        assert_eq!(report.total_diseases_found, 5);
        assert_eq!(report.top_diseases.len(), 5);
        assert_eq!(report.best_match_percentage, 50.0);
        assert_eq!(report.data_source, "internal database");
        assert!(report.advisory.is_none());
        assert!(!report.needs_external_lookup());

        let flu = &report.top_diseases[0];
        assert_eq!(flu.rank, 1);
        assert_eq!(flu.name_en, "influenza");
        assert_eq!(flu.all_symptom_names.len(), flu.total_profile_size);
        assert_eq!(flu.all_symptom_names[0], "fever");
    }

    #[test]
    fn percentages_are_rounded() {
        let report = report_for(&["lethargy", "headache", "insomnia"]);
        assert_eq!(report.top_diseases[2].disease_id, "DIS_FLU");
        assert_eq!(report.top_diseases[2].match_percentage, 16.67);
        assert_eq!(report.best_match_percentage, 75.0);
    }

    #[test]
    fn low_confidence_report_asks_for_fallback() {
        let report = report_for(&["muscle ache"]);

        assert_eq!(report.confidence, Some(Confidence::Low));
        assert!(report.advisory.as_deref().unwrap().contains("healthcare facility"));
        let request = report.external_lookup.unwrap();
        assert_eq!(request.symptoms, vec!["muscle ache"]);
        assert_eq!(
            request.reason,
            FallbackReason::LowConfidence {
                best_match_percentage: 16.67
            }
        );
    }

    #[test]
    fn no_match_report_splits_input() {
        let report = report_for(&["xyzzy", "qwerty"]);

        assert_eq!(report.match_type, MatchType::None);
        assert!(report.top_diseases.is_empty());
        assert!(report.found_in_database.is_empty());
        assert_eq!(report.not_found_in_database, vec!["xyzzy", "qwerty"]);
        assert_eq!(
            report.external_lookup.unwrap().reason,
            FallbackReason::NoVocabularyMatch
        );
        assert!(report.advisory.is_none());
    }

    #[test]
    fn unassociated_terms_report_no_candidates() {
        let report = report_for(&["dizziness"]);
        assert_eq!(report.found_in_database, vec!["dizziness"]);
        assert_eq!(
            report.external_lookup.unwrap().reason,
            FallbackReason::NoCandidateDiseases
        );
    }

    #[test]
    fn pattern_report_carries_rule_hit() {
        let report = report_for(&["nausea", "diarrhea", "fever"]);
        assert_eq!(report.match_type, MatchType::Pattern);
        assert!(report.top_diseases.is_empty());
        assert_eq!(report.pattern.unwrap().disease_id, "DIS_00000389");
        assert!(report.external_lookup.is_none());
    }

    #[test]
    fn pattern_report_splits_unknown_terms() {
        let report = report_for(&["nausea", "diarrhea", "fever", "xyzzy"]);
        assert_eq!(report.match_type, MatchType::Pattern);
        assert_eq!(report.found_in_database, vec!["nausea", "diarrhea", "fever"]);
        assert_eq!(report.not_found_in_database, vec!["xyzzy"]);
        assert_eq!(report.input_symptoms.len(), 4);
    }

    #[test]
    fn report_top_bounds_reported_candidates() {
        let snapshot = VocabularySnapshot::load_test();
        let engine = DiagnosisEngine::with_defaults();
        let input = raw(&["fever", "cough", "sore throat"]);
        let diagnosis = engine.diagnose(&snapshot, &input).unwrap();
        let report = build_report(&diagnosis, &input, &snapshot, 2);
        assert_eq!(report.top_diseases.len(), 2);
        assert_eq!(report.total_diseases_found, 5);
    }

    #[test]
    fn attach_external_records_finding() {
        let mut report = report_for(&["muscle ache"]);
        let source = StubSource::new(false);
        attach_external(&mut report, &source);

        assert_eq!(source.calls.get(), 1);
        match report.external_analysis.unwrap() {
            ExternalAnalysis::Found(finding) => {
                assert_eq!(finding.source, "stub");
                assert_eq!(finding.information, "looked up muscle ache");
            }
            other => panic!("Expected finding, got: {:?}", other),
        }
    }

    #[test]
    fn attach_external_records_failure() {
        let mut report = report_for(&["xyzzy"]);
        attach_external(&mut report, &StubSource::new(true));
        match report.external_analysis.unwrap() {
            ExternalAnalysis::Failed { error } => assert!(error.contains("timed out")),
            other => panic!("Expected failure, got: {:?}", other),
        }
    }

    #[test]
    fn attach_external_skips_confident_reports() {
        let mut report = report_for(&["fever", "cough", "sore throat"]);
        let source = StubSource::new(false);
        attach_external(&mut report, &source);
        assert_eq!(source.calls.get(), 0);
        assert!(report.external_analysis.is_none());
    }

    #[test]
    fn lookup_request_serializes_flat() {
        let request = ExternalLookupRequest {
            symptoms: vec!["fever".into()],
            reason: FallbackReason::LowConfidence {
                best_match_percentage: 20.0,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["reason"], "low_confidence");
        assert_eq!(json["best_match_percentage"], 20.0);
        assert_eq!(json["symptoms"][0], "fever");
    }
}
