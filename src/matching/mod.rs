//! Matching engine: raw symptom terms in, ranked candidate diseases out.
//!
//! Pipeline: override rules on the raw input, then normalization, scoring,
//! ranking and the confidence gate. Report assembly sits on top.

pub mod confidence;
pub mod engine;
pub mod normalizer;
pub mod ranker;
pub mod report;
pub mod rules;
pub mod scorer;
pub mod types;

pub use confidence::{classify_confidence, ConfidenceGate, IN_PERSON_ADVISORY};
pub use engine::DiagnosisEngine;
pub use normalizer::{NormalizedInput, TermNormalizer};
pub use ranker::rank;
pub use report::{
    attach_external, build_report, CandidateDetail, DiagnosisReport, ExternalAnalysis,
    ExternalFinding, ExternalKnowledge, ExternalKnowledgeError, ExternalLookupRequest,
    FallbackReason,
};
pub use rules::{OverrideRule, RuleTable};
pub use scorer::{coverage_percentage, score};
pub use types::*;

use thiserror::Error;

use crate::vocabulary::VocabularyError;

#[derive(Error, Debug)]
pub enum DiagnosisError {
    #[error("No symptoms provided")]
    EmptyInput,

    #[error(
        "Inconsistent profile for disease {disease_id}: size {profile_size} with {matching_count} matches"
    )]
    InconsistentProfile {
        disease_id: String,
        profile_size: usize,
        matching_count: usize,
    },

    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),
}
