pub mod association;
pub mod disease;
pub mod enums;
pub mod symptom;

pub use association::*;
pub use disease::*;
pub use symptom::*;

/// Synonym fields arrive either as a JSON array or as a comma/semicolon
/// separated string (or null) depending on the export.
pub(crate) mod synonyms {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(match raw {
            None => Vec::new(),
            Some(Raw::List(items)) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Raw::Text(text)) => split(&text),
        })
    }

    pub fn split(text: &str) -> Vec<String> {
        text.split([',', ';'])
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
