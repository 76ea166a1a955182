//! SQL text generation from entity descriptors
//!
//! Statement text is derived per entity type: an auto-increment integer
//! primary key `id`, then one column per descriptor field using the fixed
//! type mapping. Identifiers are double-quoted; values are always bound as
//! parameters.

use crate::entity::Entity;

/// Table-existence probe, the SQLite counterpart of
/// `information_schema.tables`
pub const TABLE_EXISTS: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1";

pub fn create_table<E: Entity>() -> String {
    let mut columns = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
    for field in E::fields() {
        columns.push(format!("\"{}\" {} NOT NULL", field.name, field.sql_type.column_type()));
    }
    format!("CREATE TABLE \"{}\" ({})", E::TYPE_NAME, columns.join(", "))
}

pub fn drop_table<E: Entity>() -> String {
    format!("DROP TABLE \"{}\"", E::TYPE_NAME)
}

pub fn insert<E: Entity>() -> String {
    let columns: Vec<String> =
        E::fields().iter().map(|f| format!("\"{}\"", f.name)).collect();
    let marks: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO \"{}\" ({}) VALUES ({})",
        E::TYPE_NAME,
        columns.join(", "),
        marks.join(", ")
    )
}

pub fn update<E: Entity>() -> String {
    let assignments: Vec<String> = E::fields()
        .iter()
        .enumerate()
        .map(|(i, f)| format!("\"{}\" = ?{}", f.name, i + 1))
        .collect();
    format!(
        "UPDATE \"{}\" SET {} WHERE id = ?{}",
        E::TYPE_NAME,
        assignments.join(", "),
        E::fields().len() + 1
    )
}

pub fn delete_by_id<E: Entity>() -> String {
    format!("DELETE FROM \"{}\" WHERE id = ?1", E::TYPE_NAME)
}

pub fn delete_by_ids<E: Entity>(count: usize) -> String {
    let marks = vec!["?"; count].join(", ");
    format!("DELETE FROM \"{}\" WHERE id IN ({})", E::TYPE_NAME, marks)
}

pub fn delete_all<E: Entity>() -> String {
    format!("DELETE FROM \"{}\"", E::TYPE_NAME)
}

fn select_columns<E: Entity>() -> String {
    let mut columns = vec!["id".to_string()];
    for field in E::fields() {
        columns.push(format!("\"{}\"", field.name));
    }
    columns.join(", ")
}

pub fn select_by_id<E: Entity>() -> String {
    format!("SELECT {} FROM \"{}\" WHERE id = ?1", select_columns::<E>(), E::TYPE_NAME)
}

pub fn select_page<E: Entity>() -> String {
    format!(
        "SELECT {} FROM \"{}\" ORDER BY id LIMIT ?1 OFFSET ?2",
        select_columns::<E>(),
        E::TYPE_NAME
    )
}

/// SELECT with one conjunct per `(property, value_count)` pair, in the given
/// order. A single accepted value becomes `col = ?`; several become
/// `col IN (?, ...)`. Callers bind values in the same left-to-right order.
pub fn select_by_filters<E: Entity>(clauses: &[(&str, usize)]) -> String {
    let base = format!("SELECT {} FROM \"{}\"", select_columns::<E>(), E::TYPE_NAME);
    if clauses.is_empty() {
        return format!("{} ORDER BY id", base);
    }

    let conjuncts: Vec<String> = clauses
        .iter()
        .map(|(name, count)| {
            if *count == 1 {
                format!("\"{}\" = ?", name)
            } else {
                format!("\"{}\" IN ({})", name, vec!["?"; *count].join(", "))
            }
        })
        .collect();
    format!("{} WHERE {} ORDER BY id", base, conjuncts.join(" AND "))
}
