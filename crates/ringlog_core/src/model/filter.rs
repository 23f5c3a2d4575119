//! Field-level filter predicates for paged queries.
//!
//! A filter is a conjunction: a record matches when every predicate holds.
//! Predicates on a `NULL` column never match.

use crate::model::field::{DataField, FieldValue};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Comparison operator between a column and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub fn sql_operator(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// `field <op> value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPredicate {
    pub field: DataField,
    pub op: Comparison,
    pub value: FieldValue,
}

/// Conjunction of field predicates. The empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFilter {
    predicates: Vec<FieldPredicate>,
}

impl DataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: DataField, op: Comparison, value: impl Into<FieldValue>) -> Self {
        self.predicates.push(FieldPredicate {
            field,
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, field: DataField, value: impl Into<FieldValue>) -> Self {
        self.with(field, Comparison::Eq, value)
    }

    /// Inclusive range `low <= field <= high`.
    pub fn between(
        self,
        field: DataField,
        low: impl Into<FieldValue>,
        high: impl Into<FieldValue>,
    ) -> Self {
        self.with(field, Comparison::Ge, low)
            .with(field, Comparison::Le, high)
    }

    /// Inclusive calendar range on `date`.
    pub fn date_between(self, from: NaiveDate, to: NaiveDate) -> Self {
        self.between(DataField::Date, from, to)
    }

    pub fn predicates(&self) -> &[FieldPredicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}
