//! Repository layer: entity-scoped database operations for the vocabulary.
//!
//! The matching engine only ever reads; inserts exist for seeding and tests.

mod association;
mod disease;
mod symptom;

pub use association::*;
pub use disease::*;
pub use symptom::*;

use crate::models::synonyms;

/// Synonyms are stored as a JSON array. Older exports carry a plain
/// comma-separated string, which is split instead.
pub(crate) fn decode_synonyms(raw: Option<String>) -> Vec<String> {
    match raw {
        None => Vec::new(),
        Some(text) => match serde_json::from_str::<Vec<String>>(&text) {
            Ok(list) => list,
            Err(_) => synonyms::split(&text),
        },
    }
}

pub(crate) fn encode_synonyms(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

/// `?1, ?2, ... ?n` for an IN clause.
pub(crate) fn placeholders(n: usize) -> String {
    (1..=n)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
