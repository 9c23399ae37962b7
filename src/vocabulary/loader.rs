//! Loading a snapshot from the JSON table export of the vocabulary.
//!
//! The export is three files of row objects, one per table.

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{VocabularyError, VocabularySnapshot};
use crate::models::{Association, Disease, SymptomTerm};

pub const SYMPTOM_TABLE: &str = "table_symptom.json";
pub const DISEASE_TABLE: &str = "table_disease.json";
pub const ASSOCIATION_TABLE: &str = "table_disease_symptom.json";

/// Load and validate a snapshot from an export directory.
///
/// Symptom rows without a canonical name and edges pointing at unknown
/// diseases or symptoms are skipped with a warning; everything else must be
/// consistent.
pub fn load_json_tables(dir: &Path) -> Result<VocabularySnapshot, VocabularyError> {
    let symptoms = read_named_symptoms(dir)?;
    let diseases: Vec<Disease> = read_table(dir, DISEASE_TABLE)?;
    let edges: Vec<Association> = read_table(dir, ASSOCIATION_TABLE)?;
    let associations = drop_dangling_edges(edges, &symptoms, &diseases);

    tracing::info!(
        dir = %dir.display(),
        symptoms = symptoms.len(),
        diseases = diseases.len(),
        associations = associations.len(),
        "Loaded vocabulary tables"
    );

    VocabularySnapshot::new(symptoms, diseases, associations)
}

fn read_named_symptoms(dir: &Path) -> Result<Vec<SymptomTerm>, VocabularyError> {
    let rows: Vec<Value> = read_table(dir, SYMPTOM_TABLE)?;
    let total = rows.len();

    let mut symptoms = Vec::with_capacity(total);
    for row in rows {
        if row.get("name_en").map_or(true, Value::is_null) {
            continue;
        }
        let symptom = serde_json::from_value(row)
            .map_err(|e| VocabularyError::DataParse(SYMPTOM_TABLE.into(), e.to_string()))?;
        symptoms.push(symptom);
    }

    let skipped = total - symptoms.len();
    if skipped > 0 {
        tracing::warn!(skipped, "Dropped symptom rows without a canonical name");
    }
    Ok(symptoms)
}

fn drop_dangling_edges(
    edges: Vec<Association>,
    symptoms: &[SymptomTerm],
    diseases: &[Disease],
) -> Vec<Association> {
    let symptom_ids: HashSet<&str> = symptoms.iter().map(|s| s.symptom_id.as_str()).collect();
    let disease_ids: HashSet<&str> = diseases.iter().map(|d| d.disease_id.as_str()).collect();

    let total = edges.len();
    let kept: Vec<Association> = edges
        .into_iter()
        .filter(|e| {
            disease_ids.contains(e.disease_id.as_str())
                && symptom_ids.contains(e.symptom_id.as_str())
        })
        .collect();

    let skipped = total - kept.len();
    if skipped > 0 {
        tracing::warn!(skipped, "Dropped associations referencing unknown diseases or symptoms");
    }
    kept
}

fn read_table<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>, VocabularyError> {
    let path = dir.join(file);
    let json = std::fs::read_to_string(&path)
        .map_err(|e| VocabularyError::DataLoad(path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| VocabularyError::DataParse(file.into(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::VocabularyLookup;

    fn write_tables(dir: &Path, associations: &str) {
        std::fs::write(
            dir.join(SYMPTOM_TABLE),
            r#"[
                {"symptom_id": "SYM_001", "name_en": "fever", "name_vn": "sốt", "frequency": "high"},
                {"symptom_id": "SYM_002", "name_en": "cough", "synonym": "tussis"}
            ]"#,
        )
        .unwrap();
        std::fs::write(
            dir.join(DISEASE_TABLE),
            r#"[
                {"disease_id": "DIS_FLU", "name_en": "influenza", "des_en": "Viral infection",
                 "specialization": "infectious disease", "synonyms": ["flu"]}
            ]"#,
        )
        .unwrap();
        std::fs::write(dir.join(ASSOCIATION_TABLE), associations).unwrap();
    }

    #[test]
    fn loads_export_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(
            dir.path(),
            r#"[
                {"disease_id": "DIS_FLU", "symptom_id": "SYM_001", "weight": 3},
                {"disease_id": "DIS_FLU", "symptom_id": "SYM_002", "weight": 2}
            ]"#,
        );

        let snapshot = load_json_tables(dir.path()).unwrap();
        assert_eq!(snapshot.canonical_symptoms().unwrap(), vec!["fever", "cough"]);
        assert_eq!(snapshot.profile_size("DIS_FLU").unwrap(), 2);
        let flu = snapshot.disease("DIS_FLU").unwrap().unwrap();
        assert_eq!(flu.description.as_deref(), Some("Viral infection"));
        assert_eq!(
            snapshot.symptom_by_name("cough").unwrap().synonyms,
            vec!["tussis"]
        );
    }

    #[test]
    fn missing_table_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        match load_json_tables(dir.path()) {
            Err(VocabularyError::DataLoad(path, _)) => assert!(path.ends_with(SYMPTOM_TABLE)),
            other => panic!("Expected DataLoad, got: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn malformed_table_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path(), r#"{"not": "a list"}"#);
        match load_json_tables(dir.path()) {
            Err(VocabularyError::DataParse(file, _)) => assert_eq!(file, ASSOCIATION_TABLE),
            other => panic!("Expected DataParse, got: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn nameless_rows_and_dangling_edges_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(
            dir.path(),
            r#"[
                {"disease_id": "DIS_FLU", "symptom_id": "SYM_001", "weight": 3},
                {"disease_id": "DIS_FLU", "symptom_id": "SYM_404", "weight": 1},
                {"disease_id": "DIS_NONE", "symptom_id": "SYM_002", "weight": 1},
                {"disease_id": "DIS_FLU", "symptom_id": "SYM_003", "weight": 2}
            ]"#,
        );
        std::fs::write(
            dir.path().join(SYMPTOM_TABLE),
            r#"[
                {"symptom_id": "SYM_001", "name_en": "fever"},
                {"symptom_id": "SYM_002", "name_en": null},
                {"symptom_id": "SYM_003"}
            ]"#,
        )
        .unwrap();

        let snapshot = load_json_tables(dir.path()).unwrap();
        assert_eq!(snapshot.canonical_symptoms().unwrap(), vec!["fever"]);
        assert_eq!(snapshot.associations().len(), 1);
        assert_eq!(snapshot.profile_size("DIS_FLU").unwrap(), 1);
    }

    #[test]
    fn snapshot_construction_stays_strict() {
        let result = VocabularySnapshot::new(
            vec![SymptomTerm::new("SYM_001", "fever")],
            vec![Disease::new("DIS_FLU", "influenza")],
            vec![Association::new("DIS_FLU", "SYM_404", 1)],
        );
        assert!(matches!(result, Err(VocabularyError::UnknownReference { .. })));
    }
}
