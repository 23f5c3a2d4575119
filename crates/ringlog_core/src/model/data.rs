//! Daily activity record.
//!
//! # Responsibility
//! - Define the canonical record stored in the `data` table.
//! - Validate identity/version invariants before persistence.
//!
//! # Invariants
//! - `id` is `None` until the first save, then stable forever.
//! - `version` starts at `0` and grows by one per successful update.
//! - Saves replace the whole record; there is no partial patch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Server-assigned record identifier.
pub type DataId = i64;

/// Calendar-day text form used in storage and at the API boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One day of activity-ring measurements.
///
/// Every measurement is optional so a partially filled editor form can still
/// be saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    /// `None` for records that were never saved.
    pub id: Option<DataId>,
    /// Optimistic-lock token. Echo it back unchanged on update.
    pub version: i32,
    /// Calendar day the measurements belong to.
    pub date: Option<NaiveDate>,
    pub moves: Option<i32>,
    pub exercise: Option<i32>,
    pub stand: Option<i32>,
    pub steps: Option<i32>,
    pub calories: Option<i32>,
}

/// Write-time validation failures for [`Data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataValidationError {
    /// Identifiers are assigned from 1 upward.
    NonPositiveId(DataId),
    /// Version tokens never go below zero.
    NegativeVersion(i32),
}

impl Display for DataValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveId(id) => write!(f, "record id must be positive, got {id}"),
            Self::NegativeVersion(version) => {
                write!(f, "record version must not be negative, got {version}")
            }
        }
    }
}

impl Error for DataValidationError {}

impl Data {
    /// Creates an unsaved, empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unsaved record for `date` with every measurement set.
    pub fn for_day(
        date: NaiveDate,
        moves: i32,
        exercise: i32,
        stand: i32,
        steps: i32,
        calories: i32,
    ) -> Self {
        Self {
            id: None,
            version: 0,
            date: Some(date),
            moves: Some(moves),
            exercise: Some(exercise),
            stand: Some(stand),
            steps: Some(steps),
            calories: Some(calories),
        }
    }

    /// Returns whether the next save will insert rather than update.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Checks identity/version invariants.
    pub fn validate(&self) -> Result<(), DataValidationError> {
        if let Some(id) = self.id {
            if id <= 0 {
                return Err(DataValidationError::NonPositiveId(id));
            }
        }
        if self.version < 0 {
            return Err(DataValidationError::NegativeVersion(self.version));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Data, DataValidationError};
    use chrono::NaiveDate;

    #[test]
    fn new_record_is_unsaved_at_version_zero() {
        let data = Data::new();
        assert!(data.is_new());
        assert_eq!(data.version, 0);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_identity_and_version() {
        let mut data = Data::new();
        data.id = Some(0);
        assert_eq!(data.validate(), Err(DataValidationError::NonPositiveId(0)));

        data.id = Some(3);
        data.version = -1;
        assert_eq!(
            data.validate(),
            Err(DataValidationError::NegativeVersion(-1))
        );
    }

    #[test]
    fn serializes_date_as_calendar_day() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let data = Data::for_day(day, 1, 2, 3, 4, 5);

        let json = serde_json::to_value(&data).expect("serialize data");
        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["id"], serde_json::Value::Null);
        assert_eq!(json["calories"], 5);
    }
}
