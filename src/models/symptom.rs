use serde::{Deserialize, Serialize};

use super::enums::FrequencyClass;
use super::synonyms;

/// A canonical symptom term of the controlled vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomTerm {
    pub symptom_id: String,
    /// Canonical English name, the join key for input matching.
    pub name_en: String,
    #[serde(default, alias = "name_vn")]
    pub name_local: Option<String>,
    #[serde(default, alias = "des_en")]
    pub description: Option<String>,
    #[serde(default, alias = "des_vn")]
    pub description_local: Option<String>,
    #[serde(default, alias = "synonym", deserialize_with = "synonyms::deserialize")]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub frequency: Option<FrequencyClass>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl SymptomTerm {
    /// Minimal term with only identifier and canonical name.
    pub fn new(symptom_id: &str, name_en: &str) -> Self {
        Self {
            symptom_id: symptom_id.to_string(),
            name_en: name_en.to_string(),
            name_local: None,
            description: None,
            description_local: None,
            synonyms: Vec::new(),
            frequency: None,
            duration: None,
        }
    }
}
