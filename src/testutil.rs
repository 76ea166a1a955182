//! Shared test entities for store and descriptor tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::entity::{Entity, FieldSpec, FieldValue, SqlType};

fn mismatch(field: &str, got: &FieldValue) -> Error {
    Error::FieldAccess(format!("{} cannot hold a {} value", field, got.type_name()))
}

/// The worked example from the persistence contract: a name plus a score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Option<i64>,
    pub full_name: String,
    pub average_score: f64,
}

impl Student {
    pub fn new(full_name: &str, average_score: f64) -> Self {
        Self { id: None, full_name: full_name.to_string(), average_score }
    }
}

impl Entity for Student {
    const TYPE_NAME: &'static str = "Student";

    fn fields() -> &'static [FieldSpec<Self>] {
        static FIELDS: [FieldSpec<Student>; 2] = [
            FieldSpec {
                name: "full_name",
                sql_type: SqlType::Varchar,
                get: |s: &Student| FieldValue::Text(s.full_name.clone()),
                set: |s: &mut Student, v: FieldValue| match v {
                    FieldValue::Text(value) => {
                        s.full_name = value;
                        Ok(())
                    }
                    other => Err(mismatch("full_name", &other)),
                },
            },
            FieldSpec {
                name: "average_score",
                sql_type: SqlType::Double,
                get: |s: &Student| FieldValue::Double(s.average_score),
                set: |s: &mut Student, v: FieldValue| match v {
                    FieldValue::Double(value) => {
                        s.average_score = value;
                        Ok(())
                    }
                    other => Err(mismatch("average_score", &other)),
                },
            },
        ];
        &FIELDS
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}

/// Exercises the remaining column types: INT, BIGINT, BOOLEAN, DATE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    pub id: Option<i64>,
    pub room_number: i32,
    pub deposit_cents: i64,
    pub active: bool,
    pub starts_on: NaiveDate,
}

impl Default for Lease {
    fn default() -> Self {
        Self {
            id: None,
            room_number: 0,
            deposit_cents: 0,
            active: false,
            starts_on: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
        }
    }
}

impl Lease {
    pub fn new(room_number: i32, deposit_cents: i64, active: bool, starts_on: NaiveDate) -> Self {
        Self { id: None, room_number, deposit_cents, active, starts_on }
    }
}

impl Entity for Lease {
    const TYPE_NAME: &'static str = "Lease";

    fn fields() -> &'static [FieldSpec<Self>] {
        static FIELDS: [FieldSpec<Lease>; 4] = [
            FieldSpec {
                name: "room_number",
                sql_type: SqlType::Int,
                get: |l: &Lease| FieldValue::Int(l.room_number),
                set: |l: &mut Lease, v: FieldValue| match v {
                    FieldValue::Int(value) => {
                        l.room_number = value;
                        Ok(())
                    }
                    other => Err(mismatch("room_number", &other)),
                },
            },
            FieldSpec {
                name: "deposit_cents",
                sql_type: SqlType::BigInt,
                get: |l: &Lease| FieldValue::Long(l.deposit_cents),
                set: |l: &mut Lease, v: FieldValue| match v {
                    FieldValue::Long(value) => {
                        l.deposit_cents = value;
                        Ok(())
                    }
                    other => Err(mismatch("deposit_cents", &other)),
                },
            },
            FieldSpec {
                name: "active",
                sql_type: SqlType::Boolean,
                get: |l: &Lease| FieldValue::Bool(l.active),
                set: |l: &mut Lease, v: FieldValue| match v {
                    FieldValue::Bool(value) => {
                        l.active = value;
                        Ok(())
                    }
                    other => Err(mismatch("active", &other)),
                },
            },
            FieldSpec {
                name: "starts_on",
                sql_type: SqlType::Date,
                get: |l: &Lease| FieldValue::Date(l.starts_on),
                set: |l: &mut Lease, v: FieldValue| match v {
                    FieldValue::Date(value) => {
                        l.starts_on = value;
                        Ok(())
                    }
                    other => Err(mismatch("starts_on", &other)),
                },
            },
        ];
        &FIELDS
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}
