use serde::{Deserialize, Serialize};

use super::synonyms;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disease {
    pub disease_id: String,
    pub name_en: String,
    #[serde(default, alias = "name_vn")]
    pub name_local: Option<String>,
    #[serde(default, alias = "des_en")]
    pub description: Option<String>,
    #[serde(default, alias = "des_vn")]
    pub description_local: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default, deserialize_with = "synonyms::deserialize")]
    pub synonyms: Vec<String>,
}

impl Disease {
    pub fn new(disease_id: &str, name_en: &str) -> Self {
        Self {
            disease_id: disease_id.to_string(),
            name_en: name_en.to_string(),
            name_local: None,
            description: None,
            description_local: None,
            specialization: None,
            synonyms: Vec::new(),
        }
    }
}
