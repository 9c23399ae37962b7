//! SQLite-backed vocabulary source.
//!
//! `SqliteVocabulary` answers engine lookups with live queries;
//! `load_snapshot` materializes the whole graph for in-memory serving.

use std::collections::{BTreeMap, BTreeSet};

use rusqlite::Connection;

use super::{VocabularyError, VocabularyLookup, VocabularySnapshot};
use crate::db::{self, DatabaseError};
use crate::models::{Association, Disease};

/// Read-only lookups straight against a vocabulary database.
pub struct SqliteVocabulary<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteVocabulary<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl VocabularyLookup for SqliteVocabulary<'_> {
    fn canonical_symptoms(&self) -> Result<Vec<String>, VocabularyError> {
        Ok(db::get_symptom_names(self.conn)?)
    }

    fn symptom_ids_for(
        &self,
        names: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, String>, VocabularyError> {
        let names: Vec<String> = names.iter().cloned().collect();
        Ok(db::get_symptom_ids_by_names(self.conn, &names)?
            .into_iter()
            .collect())
    }

    fn associations_for(
        &self,
        symptom_ids: &BTreeSet<String>,
    ) -> Result<Vec<Association>, VocabularyError> {
        let ids: Vec<String> = symptom_ids.iter().cloned().collect();
        Ok(db::get_associations_for_symptoms(self.conn, &ids)?)
    }

    fn profile_size(&self, disease_id: &str) -> Result<usize, VocabularyError> {
        Ok(db::count_profile(self.conn, disease_id)?)
    }

    fn disease(&self, disease_id: &str) -> Result<Option<Disease>, VocabularyError> {
        Ok(db::get_disease(self.conn, disease_id)?)
    }
}

/// Read the entire vocabulary into a validated snapshot.
pub fn load_snapshot(conn: &Connection) -> Result<VocabularySnapshot, VocabularyError> {
    let symptoms = db::get_all_symptoms(conn)?;
    let diseases = db::get_all_diseases(conn)?;
    let associations = db::get_all_associations(conn)?;
    VocabularySnapshot::new(symptoms, diseases, associations)
}

/// Write a snapshot into an empty vocabulary database in one transaction.
pub fn import_snapshot(
    conn: &mut Connection,
    snapshot: &VocabularySnapshot,
) -> Result<(), VocabularyError> {
    let tx = conn.transaction().map_err(DatabaseError::from)?;
    for symptom in snapshot.symptoms() {
        db::insert_symptom(&tx, symptom)?;
    }
    for disease in snapshot.diseases() {
        db::insert_disease(&tx, disease)?;
    }
    for edge in snapshot.associations() {
        db::insert_association(&tx, edge)?;
    }
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        symptoms = snapshot.symptoms().len(),
        diseases = snapshot.diseases().len(),
        associations = snapshot.associations().len(),
        "Imported vocabulary into database"
    );
    Ok(())
}
