use std::str::FromStr;

use rusqlite::{params, params_from_iter, Connection};

use super::{decode_synonyms, encode_synonyms, placeholders};
use crate::db::DatabaseError;
use crate::models::enums::FrequencyClass;
use crate::models::*;

type SymptomRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

pub fn insert_symptom(conn: &Connection, symptom: &SymptomTerm) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO symptoms (symptom_id, name_en, name_local, description, description_local,
         synonyms, frequency, duration)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            symptom.symptom_id,
            symptom.name_en,
            symptom.name_local,
            symptom.description,
            symptom.description_local,
            encode_synonyms(&symptom.synonyms),
            symptom.frequency.map(|f| f.as_str()),
            symptom.duration,
        ],
    )?;
    Ok(())
}

/// All vocabulary terms, ordered by identifier.
pub fn get_all_symptoms(conn: &Connection) -> Result<Vec<SymptomTerm>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT symptom_id, name_en, name_local, description, description_local, synonyms,
         frequency, duration
         FROM symptoms ORDER BY symptom_id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, Option<String>>(7)?,
        ))
    })?;

    let mut symptoms = Vec::new();
    for row in rows {
        symptoms.push(symptom_from_row(row?)?);
    }
    Ok(symptoms)
}

/// Canonical names only, ordered by identifier.
pub fn get_symptom_names(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT name_en FROM symptoms ORDER BY symptom_id")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Resolve canonical names to `(symptom_id, name_en)` pairs. Unknown names are skipped.
pub fn get_symptom_ids_by_names(
    conn: &Connection,
    names: &[String],
) -> Result<Vec<(String, String)>, DatabaseError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT symptom_id, name_en FROM symptoms WHERE name_en IN ({}) ORDER BY symptom_id",
        placeholders(names.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(names.iter()), |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn symptom_from_row(row: SymptomRow) -> Result<SymptomTerm, DatabaseError> {
    let (
        symptom_id,
        name_en,
        name_local,
        description,
        description_local,
        synonyms,
        frequency,
        duration,
    ) = row;
    let frequency = frequency
        .as_deref()
        .map(FrequencyClass::from_str)
        .transpose()?;

    Ok(SymptomTerm {
        symptom_id,
        name_en,
        name_local,
        description,
        description_local,
        synonyms: decode_synonyms(synonyms),
        frequency,
        duration,
    })
}
