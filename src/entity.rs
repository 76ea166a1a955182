//! Entity descriptors - compile-time field metadata
//!
//! Every persisted record type declares a static descriptor: its type name,
//! an id accessor pair, and one [`FieldSpec`] per property. The stores drive
//! serialization, SQL generation, and filter evaluation through these
//! descriptors, so no runtime name-based accessor lookup exists anywhere.

use chrono::NaiveDate;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;

/// SQL column types assignable to entity fields.
///
/// The column text emitted for each tag is fixed; SQLite resolves it to a
/// storage affinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Int,
    BigInt,
    Varchar,
    Boolean,
    Double,
    Date,
}

impl SqlType {
    /// Column type text used in generated DDL
    pub fn column_type(&self) -> &'static str {
        match self {
            SqlType::Int => "INT",
            SqlType::BigInt => "BIGINT",
            SqlType::Varchar => "VARCHAR(255)",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Double => "DOUBLE",
            SqlType::Date => "DATE",
        }
    }
}

/// A single typed field value, as produced by getters and consumed by
/// setters and SQL parameter binding.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    /// Name of the contained variant, for descriptor error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Int(_) => "int",
            FieldValue::Long(_) => "long",
            FieldValue::Double(_) => "double",
            FieldValue::Bool(_) => "bool",
            FieldValue::Text(_) => "text",
            FieldValue::Date(_) => "date",
        }
    }

    /// Parse a filter value string into the typed value a field of `ty`
    /// could hold. Returns `None` when the string cannot represent such a
    /// value - a filter entry that parses to `None` can never match.
    pub fn parse(s: &str, ty: SqlType) -> Option<FieldValue> {
        let s = s.trim();
        match ty {
            SqlType::Int => s.parse().ok().map(FieldValue::Int),
            SqlType::BigInt => s.parse().ok().map(FieldValue::Long),
            SqlType::Double => s.parse().ok().map(FieldValue::Double),
            SqlType::Boolean => match s.to_lowercase().as_str() {
                "true" | "1" => Some(FieldValue::Bool(true)),
                "false" | "0" => Some(FieldValue::Bool(false)),
                _ => None,
            },
            SqlType::Varchar => Some(FieldValue::Text(s.to_string())),
            SqlType::Date => s.parse().ok().map(FieldValue::Date),
        }
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FieldValue::Int(v) => v.to_sql(),
            FieldValue::Long(v) => v.to_sql(),
            FieldValue::Double(v) => v.to_sql(),
            FieldValue::Bool(v) => v.to_sql(),
            FieldValue::Text(v) => v.to_sql(),
            FieldValue::Date(v) => v.to_sql(),
        }
    }
}

/// Descriptor for one declared property of an entity type.
///
/// The getter and setter are plain function pointers so the whole field
/// table can live in a `static`.
pub struct FieldSpec<E> {
    /// Property name - doubles as the JSON key, SQL column, and filter key
    pub name: &'static str,
    /// Column type for generated DDL and typed filter parsing
    pub sql_type: SqlType,
    /// Reads the property off an entity
    pub get: fn(&E) -> FieldValue,
    /// Writes the property onto an entity; fails on a variant mismatch
    pub set: fn(&mut E, FieldValue) -> Result<()>,
}

/// A record shape with an auto-assigned integer identifier plus declared
/// properties.
///
/// The identifier is owned by the stores: it is `None` until a create
/// operation assigns it, and create paths reject entities that arrive with
/// an id already set.
pub trait Entity: Clone + Default + Serialize + DeserializeOwned + Send + 'static {
    /// Simple type name - resolves the physical location
    /// (`<TYPE_NAME>Table.json` or the SQL table name)
    const TYPE_NAME: &'static str;

    /// The declared non-id fields, in column order
    fn fields() -> &'static [FieldSpec<Self>];

    /// Current identifier, if assigned
    fn id(&self) -> Option<i64>;

    /// Overwrite the identifier; only stores call this
    fn set_id(&mut self, id: Option<i64>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{Lease, Student};

    #[test]
    fn test_getter_setter_roundtrip() {
        let mut student = Student::default();
        for field in Student::fields() {
            match field.name {
                "full_name" => (field.set)(&mut student, FieldValue::Text("Ann".into())).unwrap(),
                "average_score" => (field.set)(&mut student, FieldValue::Double(5.0)).unwrap(),
                other => panic!("unexpected field {}", other),
            }
        }
        assert_eq!(student.full_name, "Ann");
        assert_eq!(student.average_score, 5.0);

        let name_field = Student::fields().iter().find(|f| f.name == "full_name").unwrap();
        assert_eq!((name_field.get)(&student), FieldValue::Text("Ann".into()));
    }

    #[test]
    fn test_setter_rejects_mismatched_variant() {
        let mut student = Student::default();
        let name_field = Student::fields().iter().find(|f| f.name == "full_name").unwrap();
        let err = (name_field.set)(&mut student, FieldValue::Bool(true)).unwrap_err();
        assert!(matches!(err, crate::Error::FieldAccess(_)));
    }

    #[test]
    fn test_parse_by_sql_type() {
        assert_eq!(FieldValue::parse("42", SqlType::Int), Some(FieldValue::Int(42)));
        assert_eq!(FieldValue::parse("5.0", SqlType::Double), Some(FieldValue::Double(5.0)));
        assert_eq!(FieldValue::parse("true", SqlType::Boolean), Some(FieldValue::Bool(true)));
        assert_eq!(FieldValue::parse("0", SqlType::Boolean), Some(FieldValue::Bool(false)));
        assert_eq!(
            FieldValue::parse("2024-06-01", SqlType::Date),
            Some(FieldValue::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()))
        );
        assert_eq!(
            FieldValue::parse("anything", SqlType::Varchar),
            Some(FieldValue::Text("anything".into()))
        );
        assert_eq!(FieldValue::parse("not a number", SqlType::Double), None);
        assert_eq!(FieldValue::parse("maybe", SqlType::Boolean), None);
    }

    #[test]
    fn test_descriptor_covers_every_declared_type() {
        let types: Vec<SqlType> = Lease::fields().iter().map(|f| f.sql_type).collect();
        assert!(types.contains(&SqlType::Int));
        assert!(types.contains(&SqlType::BigInt));
        assert!(types.contains(&SqlType::Boolean));
        assert!(types.contains(&SqlType::Date));
    }

    #[test]
    fn test_column_type_mapping() {
        assert_eq!(SqlType::Int.column_type(), "INT");
        assert_eq!(SqlType::BigInt.column_type(), "BIGINT");
        assert_eq!(SqlType::Varchar.column_type(), "VARCHAR(255)");
        assert_eq!(SqlType::Boolean.column_type(), "BOOLEAN");
        assert_eq!(SqlType::Double.column_type(), "DOUBLE");
        assert_eq!(SqlType::Date.column_type(), "DATE");
    }
}
