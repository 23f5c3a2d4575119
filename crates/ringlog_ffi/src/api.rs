//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the record endpoint (`list/get/update/delete/count`) to Dart via FRB.
//! - Define the data types that cross the bridge.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Only `#[frb(sync)]` functions and plain data types are public here;
//!   endpoint plumbing lives in `crate::endpoint`.
//! - A version conflict always surfaces as `EndpointError::Conflict` with
//!   `CONFLICT_MESSAGE`.
//! - No authentication: every call is anonymous.

use crate::endpoint::{page_request, DataEndpoint};
use chrono::NaiveDate;
use ringlog_core::db::DB_PATH_ENV;
use ringlog_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Data, Page, DATE_FORMAT,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Fixed message for every optimistic-lock conflict.
pub const CONFLICT_MESSAGE: &str =
    "Somebody else has updated the data while you were making changes.";
const DB_FILE_NAME: &str = "ringlog.sqlite3";
static ENDPOINT: OnceLock<DataEndpoint> = OnceLock::new();

/// Caller-visible endpoint failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// The record changed since the caller loaded it.
    Conflict,
    /// Request input was rejected before reaching storage.
    InvalidRequest(String),
    /// Storage failed for a reason other than a conflict.
    Storage(String),
}

impl EndpointError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

impl Display for EndpointError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict => f.write_str(CONFLICT_MESSAGE),
            Self::InvalidRequest(message) => write!(f, "invalid request: {message}"),
            Self::Storage(message) => write!(f, "storage failure: {message}"),
        }
    }
}

impl Error for EndpointError {}

/// Record shape exchanged with Dart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataItem {
    /// `None` for records that were never saved.
    pub id: Option<i64>,
    /// Version token from the last read; send it back unchanged.
    pub version: i32,
    /// Calendar day as `YYYY-MM-DD`.
    pub date: Option<String>,
    pub moves: Option<i32>,
    pub exercise: Option<i32>,
    pub stand: Option<i32>,
    pub steps: Option<i32>,
    pub calories: Option<i32>,
}

impl From<Data> for DataItem {
    fn from(data: Data) -> Self {
        Self {
            id: data.id,
            version: data.version,
            date: data.date.map(|date| date.format(DATE_FORMAT).to_string()),
            moves: data.moves,
            exercise: data.exercise,
            stand: data.stand,
            steps: data.steps,
            calories: data.calories,
        }
    }
}

impl TryFrom<DataItem> for Data {
    type Error = EndpointError;

    fn try_from(item: DataItem) -> Result<Self, Self::Error> {
        let date = match item.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| {
                EndpointError::InvalidRequest(format!("date `{text}` is not YYYY-MM-DD"))
            })?),
        };
        Ok(Data {
            id: item.id,
            version: item.version,
            date,
            moves: item.moves,
            exercise: item.exercise,
            stand: item.stand,
            steps: item.steps,
            calories: item.calories,
        })
    }
}

/// One `(property, direction)` sort entry from the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortItem {
    pub property: String,
    pub ascending: bool,
}

/// Page envelope returned by `data_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPage {
    pub items: Vec<DataItem>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl From<Page<Data>> for DataPage {
    fn from(page: Page<Data>) -> Self {
        let total_pages = page.total_pages();
        let page = page.map(DataItem::from);
        Self {
            items: page.content,
            page: page.page,
            size: page.size,
            total_elements: page.total_elements,
            total_pages,
        }
    }
}

/// Process-wide endpoint bound to the configured database file.
///
/// The path is resolved once from `RINGLOG_DB_PATH`, falling back to a file
/// in the system temp directory.
fn shared_endpoint() -> &'static DataEndpoint {
    ENDPOINT.get_or_init(|| DataEndpoint::new(resolve_db_path()))
}

fn resolve_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Lists one grid page.
///
/// # FFI contract
/// - `size` must be at least 1.
/// - `sort` properties must be record field names (`date`, `steps`, ...).
#[flutter_rust_bridge::frb(sync)]
pub fn data_list(page: u32, size: u32, sort: Vec<SortItem>) -> Result<DataPage, EndpointError> {
    let request = page_request(page, size, &sort)?;
    shared_endpoint().list(&request).map(DataPage::from)
}

/// Loads one record, `None` when it does not exist.
#[flutter_rust_bridge::frb(sync)]
pub fn data_get(id: i64) -> Result<Option<DataItem>, EndpointError> {
    Ok(shared_endpoint().get(id)?.map(DataItem::from))
}

/// Inserts (`id = None`) or replaces a record.
///
/// # FFI contract
/// - Send the full record including `version`; partial updates are not
///   supported.
/// - Stale versions fail with `EndpointError::Conflict`.
#[flutter_rust_bridge::frb(sync)]
pub fn data_update(item: DataItem) -> Result<DataItem, EndpointError> {
    let data = Data::try_from(item)?;
    shared_endpoint().update(&data).map(DataItem::from)
}

/// Deletes a record; unknown ids succeed.
#[flutter_rust_bridge::frb(sync)]
pub fn data_delete(id: i64) -> Result<(), EndpointError> {
    shared_endpoint().delete(id)
}

/// Counts all records.
#[flutter_rust_bridge::frb(sync)]
pub fn data_count() -> Result<u64, EndpointError> {
    shared_endpoint().count()
}
