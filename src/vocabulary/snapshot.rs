use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::{VocabularyError, VocabularyLookup};
use crate::models::{Association, Disease, SymptomTerm};

/// Immutable, validated in-memory copy of the vocabulary and association graph.
///
/// Built once and shared behind an `Arc`; every request reads the same
/// snapshot until a refresh swaps in a new one (see `SnapshotHandle`).
#[derive(Debug, Clone)]
pub struct VocabularySnapshot {
    symptoms: Vec<SymptomTerm>,
    diseases: Vec<Disease>,
    associations: Vec<Association>,
    symptom_by_id: HashMap<String, usize>,
    symptom_by_name: HashMap<String, usize>,
    disease_by_id: HashMap<String, usize>,
    /// symptom_id -> indexes into `associations`, ascending.
    edges_by_symptom: HashMap<String, Vec<usize>>,
    /// disease_id -> indexes into `associations`, ascending.
    edges_by_disease: HashMap<String, Vec<usize>>,
}

impl VocabularySnapshot {
    /// Build and validate a snapshot.
    ///
    /// Rejects duplicate identifiers, duplicate canonical names, duplicate
    /// (disease, symptom) pairs and edges pointing at unknown entities.
    pub fn new(
        symptoms: Vec<SymptomTerm>,
        diseases: Vec<Disease>,
        associations: Vec<Association>,
    ) -> Result<Self, VocabularyError> {
        let mut symptom_by_id = HashMap::with_capacity(symptoms.len());
        let mut symptom_by_name = HashMap::with_capacity(symptoms.len());
        for (idx, symptom) in symptoms.iter().enumerate() {
            if symptom_by_id.insert(symptom.symptom_id.clone(), idx).is_some() {
                return Err(duplicate("symptom id", &symptom.symptom_id));
            }
            if symptom_by_name.insert(symptom.name_en.clone(), idx).is_some() {
                return Err(duplicate("symptom name", &symptom.name_en));
            }
        }

        let mut disease_by_id = HashMap::with_capacity(diseases.len());
        for (idx, disease) in diseases.iter().enumerate() {
            if disease_by_id.insert(disease.disease_id.clone(), idx).is_some() {
                return Err(duplicate("disease id", &disease.disease_id));
            }
        }

        let mut seen_pairs: HashSet<(&str, &str)> = HashSet::with_capacity(associations.len());
        let mut edges_by_symptom: HashMap<String, Vec<usize>> = HashMap::new();
        let mut edges_by_disease: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, edge) in associations.iter().enumerate() {
            if !disease_by_id.contains_key(&edge.disease_id) {
                return Err(VocabularyError::UnknownReference {
                    entity_type: "disease".into(),
                    id: edge.disease_id.clone(),
                });
            }
            if !symptom_by_id.contains_key(&edge.symptom_id) {
                return Err(VocabularyError::UnknownReference {
                    entity_type: "symptom".into(),
                    id: edge.symptom_id.clone(),
                });
            }
            if !seen_pairs.insert((edge.disease_id.as_str(), edge.symptom_id.as_str())) {
                return Err(VocabularyError::DuplicateAssociation {
                    disease_id: edge.disease_id.clone(),
                    symptom_id: edge.symptom_id.clone(),
                });
            }
            edges_by_symptom
                .entry(edge.symptom_id.clone())
                .or_default()
                .push(idx);
            edges_by_disease
                .entry(edge.disease_id.clone())
                .or_default()
                .push(idx);
        }
        drop(seen_pairs);

        tracing::debug!(
            symptoms = symptoms.len(),
            diseases = diseases.len(),
            associations = associations.len(),
            "Vocabulary snapshot built"
        );

        Ok(Self {
            symptoms,
            diseases,
            associations,
            symptom_by_id,
            symptom_by_name,
            disease_by_id,
            edges_by_symptom,
            edges_by_disease,
        })
    }

    pub fn symptoms(&self) -> &[SymptomTerm] {
        &self.symptoms
    }

    pub fn diseases(&self) -> &[Disease] {
        &self.diseases
    }

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    pub fn symptom_by_name(&self, name_en: &str) -> Option<&SymptomTerm> {
        self.symptom_by_name.get(name_en).map(|&i| &self.symptoms[i])
    }

    pub fn symptom_by_id(&self, symptom_id: &str) -> Option<&SymptomTerm> {
        self.symptom_by_id.get(symptom_id).map(|&i| &self.symptoms[i])
    }

    pub fn disease_by_id(&self, disease_id: &str) -> Option<&Disease> {
        self.disease_by_id.get(disease_id).map(|&i| &self.diseases[i])
    }

    /// Canonical names of every symptom in the disease profile, in edge order.
    pub fn profile_names(&self, disease_id: &str) -> Vec<&str> {
        self.edges_by_disease
            .get(disease_id)
            .map(|edges| {
                edges
                    .iter()
                    .filter_map(|&i| self.symptom_by_id(&self.associations[i].symptom_id))
                    .map(|s| s.name_en.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Create a small vocabulary for tests (no file I/O).
    pub fn load_test() -> Self {
        let symptoms = [
            ("SYM_001", "fever"),
            ("SYM_002", "cough"),
            ("SYM_003", "headache"),
            ("SYM_004", "fatigue"),
            ("SYM_005", "sore throat"),
            ("SYM_006", "runny nose"),
            ("SYM_007", "nausea"),
            ("SYM_008", "vomiting"),
            ("SYM_009", "diarrhea"),
            ("SYM_010", "abdominal pain"),
            ("SYM_011", "lethargy"),
            ("SYM_012", "insomnia"),
            ("SYM_013", "muscle ache"),
            ("SYM_014", "rash"),
            ("SYM_015", "dizziness"),
        ]
        .iter()
        .map(|(id, name)| SymptomTerm::new(id, name))
        .collect();

        let diseases = [
            ("DIS_00000675", "parenchymatous neurosyphilis"),
            ("DIS_00000389", "acanthocephaliasis"),
            ("DIS_FLU", "influenza"),
            ("DIS_COLD", "common cold"),
            ("DIS_GASTRO", "gastroenteritis"),
            ("DIS_MEASLES", "measles"),
        ]
        .iter()
        .map(|(id, name)| Disease::new(id, name))
        .collect();

        let edges: &[(&str, &str, u32)] = &[
            ("DIS_00000675", "SYM_011", 3),
            ("DIS_00000675", "SYM_003", 2),
            ("DIS_00000675", "SYM_012", 2),
            ("DIS_00000675", "SYM_004", 1),
            ("DIS_00000389", "SYM_010", 3),
            ("DIS_00000389", "SYM_007", 2),
            ("DIS_00000389", "SYM_009", 2),
            ("DIS_00000389", "SYM_001", 1),
            ("DIS_00000389", "SYM_008", 1),
            ("DIS_FLU", "SYM_001", 3),
            ("DIS_FLU", "SYM_002", 2),
            ("DIS_FLU", "SYM_003", 1),
            ("DIS_FLU", "SYM_004", 2),
            ("DIS_FLU", "SYM_013", 2),
            ("DIS_FLU", "SYM_005", 1),
            ("DIS_COLD", "SYM_002", 2),
            ("DIS_COLD", "SYM_005", 2),
            ("DIS_COLD", "SYM_006", 3),
            ("DIS_COLD", "SYM_003", 1),
            ("DIS_GASTRO", "SYM_007", 2),
            ("DIS_GASTRO", "SYM_008", 3),
            ("DIS_GASTRO", "SYM_009", 3),
            ("DIS_GASTRO", "SYM_010", 2),
            ("DIS_GASTRO", "SYM_001", 1),
            ("DIS_MEASLES", "SYM_001", 2),
            ("DIS_MEASLES", "SYM_014", 3),
            ("DIS_MEASLES", "SYM_002", 1),
            ("DIS_MEASLES", "SYM_006", 1),
        ];
        let associations = edges
            .iter()
            .map(|(d, s, w)| Association::new(d, s, *w))
            .collect();

        match Self::new(symptoms, diseases, associations) {
            Ok(snapshot) => snapshot,
            Err(e) => unreachable!("test vocabulary is consistent: {e}"),
        }
    }
}

fn duplicate(entity_type: &str, key: &str) -> VocabularyError {
    VocabularyError::Duplicate {
        entity_type: entity_type.into(),
        key: key.into(),
    }
}

impl VocabularyLookup for VocabularySnapshot {
    fn canonical_symptoms(&self) -> Result<Vec<String>, VocabularyError> {
        Ok(self.symptoms.iter().map(|s| s.name_en.clone()).collect())
    }

    fn symptom_ids_for(
        &self,
        names: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, String>, VocabularyError> {
        Ok(names
            .iter()
            .filter_map(|name| self.symptom_by_name(name))
            .map(|s| (s.symptom_id.clone(), s.name_en.clone()))
            .collect())
    }

    fn associations_for(
        &self,
        symptom_ids: &BTreeSet<String>,
    ) -> Result<Vec<Association>, VocabularyError> {
        // Graph order, independent of how the id set iterates.
        let mut indexes: Vec<usize> = symptom_ids
            .iter()
            .filter_map(|id| self.edges_by_symptom.get(id))
            .flatten()
            .copied()
            .collect();
        indexes.sort_unstable();
        Ok(indexes
            .into_iter()
            .map(|i| self.associations[i].clone())
            .collect())
    }

    fn profile_size(&self, disease_id: &str) -> Result<usize, VocabularyError> {
        Ok(self.edges_by_disease.get(disease_id).map_or(0, Vec::len))
    }

    fn disease(&self, disease_id: &str) -> Result<Option<Disease>, VocabularyError> {
        Ok(self.disease_by_id(disease_id).cloned())
    }
}
