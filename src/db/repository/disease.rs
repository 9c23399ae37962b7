use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{decode_synonyms, encode_synonyms};
use crate::db::DatabaseError;
use crate::models::*;

const DISEASE_COLUMNS: &str =
    "disease_id, name_en, name_local, description, description_local, specialization, synonyms";

pub fn insert_disease(conn: &Connection, disease: &Disease) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO diseases (disease_id, name_en, name_local, description, description_local,
         specialization, synonyms)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            disease.disease_id,
            disease.name_en,
            disease.name_local,
            disease.description,
            disease.description_local,
            disease.specialization,
            encode_synonyms(&disease.synonyms),
        ],
    )?;
    Ok(())
}

pub fn get_all_diseases(conn: &Connection) -> Result<Vec<Disease>, DatabaseError> {
    let sql = format!("SELECT {DISEASE_COLUMNS} FROM diseases ORDER BY disease_id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], disease_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn get_disease(conn: &Connection, disease_id: &str) -> Result<Option<Disease>, DatabaseError> {
    let sql = format!("SELECT {DISEASE_COLUMNS} FROM diseases WHERE disease_id = ?1");
    let disease = conn
        .query_row(&sql, params![disease_id], disease_from_row)
        .optional()?;
    Ok(disease)
}

fn disease_from_row(row: &Row<'_>) -> rusqlite::Result<Disease> {
    Ok(Disease {
        disease_id: row.get(0)?,
        name_en: row.get(1)?,
        name_local: row.get(2)?,
        description: row.get(3)?,
        description_local: row.get(4)?,
        specialization: row.get(5)?,
        synonyms: decode_synonyms(row.get::<_, Option<String>>(6)?),
    })
}
