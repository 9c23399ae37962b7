use serde::{Deserialize, Serialize};

/// Weighted edge between a disease and one symptom of its profile.
/// A (disease, symptom) pair appears at most once in a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub disease_id: String,
    pub symptom_id: String,
    /// Clinical significance of the symptom for the disease.
    #[serde(default)]
    pub weight: u32,
}

impl Association {
    pub fn new(disease_id: &str, symptom_id: &str, weight: u32) -> Self {
        Self {
            disease_id: disease_id.to_string(),
            symptom_id: symptom_id.to_string(),
            weight,
        }
    }
}
