use rusqlite::{params, params_from_iter, Connection, Row};

use super::placeholders;
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_association(conn: &Connection, edge: &Association) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO disease_symptom (disease_id, symptom_id, weight) VALUES (?1, ?2, ?3)",
        params![edge.disease_id, edge.symptom_id, edge.weight],
    )?;
    Ok(())
}

/// Every edge of the graph, ordered by (disease, symptom).
pub fn get_all_associations(conn: &Connection) -> Result<Vec<Association>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT disease_id, symptom_id, weight FROM disease_symptom
         ORDER BY disease_id, symptom_id",
    )?;
    let rows = stmt.query_map([], association_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Edges touching any of the given symptoms, ordered by (disease, symptom).
pub fn get_associations_for_symptoms(
    conn: &Connection,
    symptom_ids: &[String],
) -> Result<Vec<Association>, DatabaseError> {
    if symptom_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT disease_id, symptom_id, weight FROM disease_symptom
         WHERE symptom_id IN ({}) ORDER BY disease_id, symptom_id",
        placeholders(symptom_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(symptom_ids.iter()), association_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Number of symptoms in a disease profile (0 for unknown diseases).
pub fn count_profile(conn: &Connection, disease_id: &str) -> Result<usize, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(symptom_id) FROM disease_symptom WHERE disease_id = ?1",
        params![disease_id],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

fn association_from_row(row: &Row<'_>) -> rusqlite::Result<Association> {
    Ok(Association {
        disease_id: row.get(0)?,
        symptom_id: row.get(1)?,
        weight: row.get(2)?,
    })
}
