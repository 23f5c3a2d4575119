//! Editor form binding for data records.
//!
//! # Responsibility
//! - Map editor input ids to record fields through a fixed table.
//! - Convert raw text input into typed record values.
//!
//! # Invariants
//! - `write_into` either writes every field or none of them.
//! - Blank input clears the field (`None`).
//! - `id` and `version` are never touched by the form.

use crate::model::data::{Data, DATE_FORMAT};
use crate::model::field::DataField;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Message shown for non-integer text in a numeric input.
pub const INTEGER_FIELD_MESSAGE: &str = "Only numbers are allowed";
/// Message shown for text that is not a `YYYY-MM-DD` date.
pub const DATE_FIELD_MESSAGE: &str = "Enter a date as YYYY-MM-DD";

/// Editable input of the record editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Date,
    Moves,
    Exercise,
    Stand,
    Steps,
    Calories,
}

impl FormField {
    /// Inputs in display order.
    pub const ALL: [FormField; 6] = [
        FormField::Date,
        FormField::Moves,
        FormField::Exercise,
        FormField::Stand,
        FormField::Steps,
        FormField::Calories,
    ];

    pub fn id(self) -> &'static str {
        self.data_field().property()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Moves => "Moves",
            Self::Exercise => "Exercise",
            Self::Stand => "Stand",
            Self::Steps => "Steps",
            Self::Calories => "Calories",
        }
    }

    pub fn data_field(self) -> DataField {
        match self {
            Self::Date => DataField::Date,
            Self::Moves => DataField::Moves,
            Self::Exercise => DataField::Exercise,
            Self::Stand => DataField::Stand,
            Self::Steps => DataField::Steps,
            Self::Calories => DataField::Calories,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.id() == id)
    }

    fn index(self) -> usize {
        self as usize
    }

    fn read(self, data: &Data) -> Option<String> {
        match self {
            Self::Date => data.date.map(|date| date.format(DATE_FORMAT).to_string()),
            Self::Moves => data.moves.map(|value| value.to_string()),
            Self::Exercise => data.exercise.map(|value| value.to_string()),
            Self::Stand => data.stand.map(|value| value.to_string()),
            Self::Steps => data.steps.map(|value| value.to_string()),
            Self::Calories => data.calories.map(|value| value.to_string()),
        }
    }
}

/// One rejected input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: &'static str,
}

/// Every rejected input of one `write_into` call, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValidationError {
    pub errors: Vec<FieldError>,
}

impl FormValidationError {
    pub fn message_for(&self, field: FormField) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }
}

impl Display for FormValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let fields = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field.label(), error.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid form input ({fields})")
    }
}

impl Error for FormValidationError {}

/// Raw text state of the record editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataForm {
    values: [String; 6],
}

/// Typed values parsed from a [`DataForm`], not yet written.
struct ParsedForm {
    date: Option<NaiveDate>,
    moves: Option<i32>,
    exercise: Option<i32>,
    stand: Option<i32>,
    steps: Option<i32>,
    calories: Option<i32>,
}

impl DataForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the form from `data`, or clears it for `None`.
    pub fn read(&mut self, data: Option<&Data>) {
        for field in FormField::ALL {
            self.values[field.index()] = data.and_then(|data| field.read(data)).unwrap_or_default();
        }
    }

    pub fn clear(&mut self) {
        self.read(None);
    }

    pub fn set(&mut self, field: FormField, text: impl Into<String>) {
        self.values[field.index()] = text.into();
    }

    pub fn value(&self, field: FormField) -> &str {
        &self.values[field.index()]
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|value| value.trim().is_empty())
    }

    /// Validates every input and writes them into `data`.
    ///
    /// On error `data` is left unchanged.
    pub fn write_into(&self, data: &mut Data) -> Result<(), FormValidationError> {
        let parsed = self.parse()?;
        data.date = parsed.date;
        data.moves = parsed.moves;
        data.exercise = parsed.exercise;
        data.stand = parsed.stand;
        data.steps = parsed.steps;
        data.calories = parsed.calories;
        Ok(())
    }

    fn parse(&self) -> Result<ParsedForm, FormValidationError> {
        let mut errors = Vec::new();

        let date = match parse_date(self.value(FormField::Date)) {
            Ok(date) => date,
            Err(message) => {
                errors.push(FieldError {
                    field: FormField::Date,
                    message,
                });
                None
            }
        };

        let mut integer = |field: FormField| match parse_integer(self.value(field)) {
            Ok(value) => value,
            Err(message) => {
                errors.push(FieldError { field, message });
                None
            }
        };
        let moves = integer(FormField::Moves);
        let exercise = integer(FormField::Exercise);
        let stand = integer(FormField::Stand);
        let steps = integer(FormField::Steps);
        let calories = integer(FormField::Calories);

        if !errors.is_empty() {
            return Err(FormValidationError { errors });
        }

        Ok(ParsedForm {
            date,
            moves,
            exercise,
            stand,
            steps,
            calories,
        })
    }
}

fn parse_integer(text: &str) -> Result<Option<i32>, &'static str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| INTEGER_FIELD_MESSAGE)
}

fn parse_date(text: &str) -> Result<Option<NaiveDate>, &'static str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| DATE_FIELD_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::{DataForm, FormField, DATE_FIELD_MESSAGE, INTEGER_FIELD_MESSAGE};
    use crate::model::data::Data;
    use chrono::NaiveDate;

    fn sample() -> Data {
        let mut data = Data::for_day(
            NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            1,
            2,
            3,
            4,
            5,
        );
        data.id = Some(7);
        data.version = 2;
        data
    }

    #[test]
    fn read_then_write_keeps_identity_and_values() {
        let original = sample();
        let mut form = DataForm::new();
        form.read(Some(&original));
        assert_eq!(form.value(FormField::Date), "2024-01-01");
        assert_eq!(form.value(FormField::Calories), "5");

        let mut target = original.clone();
        form.set(FormField::Moves, " 10 ");
        form.write_into(&mut target).expect("valid form");

        assert_eq!(target.id, Some(7));
        assert_eq!(target.version, 2);
        assert_eq!(target.moves, Some(10));
        assert_eq!(target.steps, Some(4));
    }

    #[test]
    fn blank_inputs_clear_fields() {
        let mut target = sample();
        let mut form = DataForm::new();
        form.read(Some(&target));
        form.set(FormField::Stand, "");
        form.set(FormField::Date, "   ");

        form.write_into(&mut target).expect("blank is allowed");
        assert_eq!(target.stand, None);
        assert_eq!(target.date, None);
    }

    #[test]
    fn invalid_inputs_are_all_reported_and_nothing_is_written() {
        let original = sample();
        let mut target = original.clone();
        let mut form = DataForm::new();
        form.read(Some(&original));
        form.set(FormField::Moves, "ten");
        form.set(FormField::Steps, "1.5");
        form.set(FormField::Date, "01/01/2024");

        let err = form.write_into(&mut target).expect_err("invalid input");
        assert_eq!(err.errors.len(), 3);
        assert_eq!(err.message_for(FormField::Moves), Some(INTEGER_FIELD_MESSAGE));
        assert_eq!(err.message_for(FormField::Steps), Some(INTEGER_FIELD_MESSAGE));
        assert_eq!(err.message_for(FormField::Date), Some(DATE_FIELD_MESSAGE));
        assert_eq!(target, original);
    }

    #[test]
    fn integer_overflow_is_rejected() {
        let mut form = DataForm::new();
        form.set(FormField::Calories, "99999999999");
        let err = form.write_into(&mut Data::new()).expect_err("overflow");
        assert_eq!(
            err.message_for(FormField::Calories),
            Some(INTEGER_FIELD_MESSAGE)
        );
    }

    #[test]
    fn clear_blanks_every_input() {
        let mut form = DataForm::new();
        form.read(Some(&sample()));
        assert!(!form.is_blank());
        form.clear();
        assert!(form.is_blank());
        assert_eq!(FormField::from_id("steps"), Some(FormField::Steps));
        assert_eq!(FormField::from_id("id"), None);
    }
}
