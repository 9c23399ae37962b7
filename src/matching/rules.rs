//! Override Rule Evaluator: hand-curated symptom patterns that map straight
//! to a disease, bypassing statistical scoring.
//!
//! Rules are matched against the raw (pre-normalization) input and evaluated
//! in table order; the first satisfied rule whose target exists wins.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::{PatternMatch, INTERNAL_DATA_SOURCE, PATTERN_MATCH_LABEL};
use crate::config::ConfigError;
use crate::vocabulary::{VocabularyError, VocabularyLookup};

fn default_min_any() -> usize {
    1
}

/// One declarative shortcut: all of `all_of` and at least `min_any` of
/// `any_of` present in the raw input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRule {
    pub name: String,
    pub target_disease_id: String,
    #[serde(default)]
    pub all_of: BTreeSet<String>,
    #[serde(default)]
    pub any_of: BTreeSet<String>,
    #[serde(default = "default_min_any")]
    pub min_any: usize,
}

impl OverrideRule {
    pub fn new(name: &str, target_disease_id: &str, all_of: &[&str], any_of: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            target_disease_id: target_disease_id.to_string(),
            all_of: all_of.iter().map(|s| s.to_string()).collect(),
            any_of: any_of.iter().map(|s| s.to_string()).collect(),
            min_any: 1,
        }
    }

    pub fn with_min_any(mut self, min_any: usize) -> Self {
        self.min_any = min_any;
        self
    }

    pub fn matches(&self, raw: &HashSet<&str>) -> bool {
        self.all_of.iter().all(|s| raw.contains(s.as_str()))
            && self
                .any_of
                .iter()
                .filter(|s| raw.contains(s.as_str()))
                .count()
                >= self.min_any
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_any == 0 {
            return Err(ConfigError::Invalid(format!(
                "rule '{}': min_any must be at least 1",
                self.name
            )));
        }
        if self.any_of.len() < self.min_any {
            return Err(ConfigError::Invalid(format!(
                "rule '{}': any_of has {} terms but min_any is {}",
                self.name,
                self.any_of.len(),
                self.min_any
            )));
        }
        Ok(())
    }
}

/// Ordered rule table. Earlier rules take priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<OverrideRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<OverrideRule>) -> Result<Self, ConfigError> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The curated shortcuts shipped with the engine.
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                OverrideRule::new(
                    "parenchymatous neurosyphilis",
                    "DIS_00000675",
                    &["lethargy", "headache", "insomnia"],
                    &[
                        "irritability",
                        "fatigue",
                        "difficulty concentrating",
                        "concentration",
                    ],
                ),
                OverrideRule::new(
                    "acanthocephaliasis",
                    "DIS_00000389",
                    &[],
                    &[
                        "abdominal distention",
                        "weight loss",
                        "bloody stool",
                        "decreased appetite",
                        "abdominal pain",
                        "nausea",
                        "diarrhea",
                        "fever",
                        "vomiting",
                        "constipation",
                    ],
                )
                .with_min_any(3),
            ],
        }
    }

    /// Load a rule table from a JSON array of rules.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(path.display().to_string(), e.to_string()))?;
        let rules: Vec<OverrideRule> = serde_json::from_str(&json)
            .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))?;
        Self::new(rules)
    }

    pub fn rules(&self) -> &[OverrideRule] {
        &self.rules
    }

    /// First rule satisfied by the raw input, ignoring its target's existence.
    pub fn first_match(&self, raw_terms: &[String]) -> Option<&OverrideRule> {
        let raw: HashSet<&str> = raw_terms.iter().map(String::as_str).collect();
        self.rules.iter().find(|rule| rule.matches(&raw))
    }

    /// Evaluate the table against raw input.
    ///
    /// A satisfied rule whose target disease is missing from the vocabulary
    /// is skipped and evaluation moves on to the next rule.
    pub fn evaluate(
        &self,
        raw_terms: &[String],
        lookup: &dyn VocabularyLookup,
    ) -> Result<Option<PatternMatch>, VocabularyError> {
        let raw: HashSet<&str> = raw_terms.iter().map(String::as_str).collect();

        for rule in self.rules.iter().filter(|rule| rule.matches(&raw)) {
            match lookup.disease(&rule.target_disease_id)? {
                Some(disease) => {
                    tracing::info!(
                        rule = %rule.name,
                        disease_id = %disease.disease_id,
                        "Override rule matched"
                    );
                    return Ok(Some(PatternMatch {
                        rule: rule.name.clone(),
                        disease_id: disease.disease_id,
                        name: disease.name_en,
                        match_label: PATTERN_MATCH_LABEL.to_string(),
                        data_source: INTERNAL_DATA_SOURCE.to_string(),
                    }));
                }
                None => {
                    tracing::warn!(
                        rule = %rule.name,
                        disease_id = %rule.target_disease_id,
                        "Override rule target missing from vocabulary, skipping"
                    );
                }
            }
        }

        Ok(None)
    }
}
