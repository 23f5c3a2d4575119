//! Static field table for [`Data`].
//!
//! Maps caller-facing property names to SQL columns and value kinds. Sort and
//! filter input is resolved through this table, so raw caller text never
//! reaches a SQL statement.

use crate::model::data::Data;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Addressable property of a [`Data`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataField {
    Id,
    Version,
    Date,
    Moves,
    Exercise,
    Stand,
    Steps,
    Calories,
}

/// Storage kind of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Date,
}

/// Typed value used in filter predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Integer(i64),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Integer(_) => FieldKind::Integer,
            Self::Date(_) => FieldKind::Date,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl DataField {
    /// Every field in column order.
    pub const ALL: [DataField; 8] = [
        DataField::Id,
        DataField::Version,
        DataField::Date,
        DataField::Moves,
        DataField::Exercise,
        DataField::Stand,
        DataField::Steps,
        DataField::Calories,
    ];

    /// Property name used by API callers and grid columns.
    pub fn property(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Version => "version",
            Self::Date => "date",
            Self::Moves => "moves",
            Self::Exercise => "exercise",
            Self::Stand => "stand",
            Self::Steps => "steps",
            Self::Calories => "calories",
        }
    }

    /// Column name in the `data` table.
    pub fn column(self) -> &'static str {
        // Same spelling as the property for every field today.
        self.property()
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::Date => FieldKind::Date,
            _ => FieldKind::Integer,
        }
    }

    /// Resolves a caller-supplied property name (case-sensitive).
    pub fn from_property(property: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.property() == property)
    }

    /// Reads this field from a record.
    pub fn value_of(self, data: &Data) -> Option<FieldValue> {
        match self {
            Self::Id => data.id.map(FieldValue::Integer),
            Self::Version => Some(FieldValue::from(data.version)),
            Self::Date => data.date.map(FieldValue::Date),
            Self::Moves => data.moves.map(FieldValue::from),
            Self::Exercise => data.exercise.map(FieldValue::from),
            Self::Stand => data.stand.map(FieldValue::from),
            Self::Steps => data.steps.map(FieldValue::from),
            Self::Calories => data.calories.map(FieldValue::from),
        }
    }
}

impl Display for DataField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.property())
    }
}
