//! Confidence Gate: grades the best candidate and signals fallback needs.
//!
//! Pure classification; acting on the signal is the caller's job.

use super::types::Confidence;
use crate::config::DEFAULT_LOW_CONFIDENCE_THRESHOLD;

/// Advisory attached to low-confidence responses.
pub const IN_PERSON_ADVISORY: &str = "The best database match covers less than half of the \
     disease's known symptoms. Please visit a healthcare facility for an in-person examination \
     and an accurate diagnosis.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceGate {
    threshold: f64,
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_CONFIDENCE_THRESHOLD)
    }
}

impl ConfidenceGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Low strictly below the threshold, high at or above it.
    pub fn classify(&self, top_coverage: f64) -> Confidence {
        if top_coverage < self.threshold {
            Confidence::Low
        } else {
            Confidence::High
        }
    }
}

/// Classify with the default 50% threshold.
pub fn classify_confidence(top_coverage: f64) -> Confidence {
    ConfidenceGate::default().classify(top_coverage)
}
