//! Core domain logic for ringlog.
//! This crate owns the record model, its SQLite store and the CRUD service.

pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use form::{DataForm, FieldError, FormField, FormValidationError};
pub use logging::{default_log_level, init_logging, init_logging_with, logging_status, LogConfig};
pub use model::data::{Data, DataId, DataValidationError, DATE_FORMAT};
pub use model::field::{DataField, FieldKind, FieldValue};
pub use model::filter::{Comparison, DataFilter, FieldPredicate};
pub use model::page::{Direction, Page, PageRequest, PageRequestError, Sort, SortOrder};
pub use repo::data_repo::{DataRepository, RepoError, RepoResult, SqliteDataRepository};
pub use service::data_service::DataService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
