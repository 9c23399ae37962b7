//! Vocabulary Index: canonical symptom terms, diseases and the weighted
//! association graph, served read-only to the matching engine.

pub mod handle;
pub mod loader;
pub mod snapshot;
pub mod sqlite;

pub use handle::SnapshotHandle;
pub use snapshot::VocabularySnapshot;
pub use sqlite::SqliteVocabulary;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::{Association, Disease};

#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Vocabulary data load failed ({0}): {1}")]
    DataLoad(String, String),

    #[error("Vocabulary data parse failed ({0}): {1}")]
    DataParse(String, String),

    #[error("Duplicate {entity_type}: {key}")]
    Duplicate { entity_type: String, key: String },

    #[error("Duplicate association: disease {disease_id} / symptom {symptom_id}")]
    DuplicateAssociation {
        disease_id: String,
        symptom_id: String,
    },

    #[error("Association references unknown {entity_type}: {id}")]
    UnknownReference { entity_type: String, id: String },

    #[error("Internal lock failed")]
    LockFailed,
}

/// Read-only lookups the matching engine needs from the vocabulary store.
///
/// Implementations must return deterministic orderings: identical data
/// yields identical sequences on every call.
pub trait VocabularyLookup {
    /// All canonical symptom names, in vocabulary order.
    fn canonical_symptoms(&self) -> Result<Vec<String>, VocabularyError>;

    /// Map canonical names to their symptom ids (`symptom_id -> name_en`).
    /// Names not in the vocabulary are omitted.
    fn symptom_ids_for(
        &self,
        names: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, String>, VocabularyError>;

    /// Every association edge whose symptom is in `symptom_ids`.
    fn associations_for(
        &self,
        symptom_ids: &BTreeSet<String>,
    ) -> Result<Vec<Association>, VocabularyError>;

    /// Total number of symptoms associated with the disease.
    fn profile_size(&self, disease_id: &str) -> Result<usize, VocabularyError>;

    fn disease(&self, disease_id: &str) -> Result<Option<Disease>, VocabularyError>;
}
