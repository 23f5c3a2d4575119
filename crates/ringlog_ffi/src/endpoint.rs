//! Record endpoint shared by the FRB API and the editor presenter.
//!
//! # Responsibility
//! - Open one connection per call and run one service operation on it.
//! - Translate repository failures into `EndpointError`.
//! - Build validated page requests from raw grid input.
//!
//! # Invariants
//! - A version conflict always surfaces as `EndpointError::Conflict`;
//!   storage error text is never attached to it.
//! - Every other persistence failure becomes `EndpointError::Storage`.

use crate::api::{EndpointError, SortItem};
use log::{error, info, warn};
use ringlog_core::db::open_db;
use ringlog_core::{
    Data, DataField, DataFilter, DataId, DataService, Direction, Page, PageRequest, RepoError,
    RepoResult, Sort, SortOrder, SqliteDataRepository,
};
use std::path::PathBuf;

pub type EndpointResult<T> = Result<T, EndpointError>;

/// Record endpoint bound to one database file.
///
/// Holds no state besides the path; safe to share between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEndpoint {
    db_path: PathBuf,
}

impl DataEndpoint {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Loads one page of records.
    pub fn list(&self, request: &PageRequest) -> EndpointResult<Page<Data>> {
        self.with_service("data_list", |service| service.list(request))
    }

    /// Loads one page of records matching `filter`.
    pub fn list_filtered(
        &self,
        request: &PageRequest,
        filter: &DataFilter,
    ) -> EndpointResult<Page<Data>> {
        self.with_service("data_list", |service| {
            service.list_filtered(request, filter)
        })
    }

    /// Loads one record; `Ok(None)` when it does not exist.
    pub fn get(&self, id: DataId) -> EndpointResult<Option<Data>> {
        self.with_service("data_get", |service| service.get(id))
    }

    /// Saves a full record copy.
    ///
    /// # Errors
    /// - `EndpointError::Conflict` when `data.version` is stale.
    pub fn update(&self, data: &Data) -> EndpointResult<Data> {
        self.with_service("data_update", |service| service.update(data))
    }

    /// Deletes a record; absence is not an error.
    pub fn delete(&self, id: DataId) -> EndpointResult<()> {
        self.with_service("data_delete", |service| service.delete(id))
    }

    pub fn count(&self) -> EndpointResult<u64> {
        self.with_service("data_count", |service| service.count())
    }

    fn with_service<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&DataService<SqliteDataRepository<'_>>) -> RepoResult<T>,
    ) -> EndpointResult<T> {
        let conn = open_db(&self.db_path).map_err(|err| {
            error!(
                "event={operation} module=endpoint status=error error_code=db_open_failed busy={} error={err}",
                err.is_busy()
            );
            EndpointError::Storage(err.to_string())
        })?;
        let repo =
            SqliteDataRepository::try_new(&conn).map_err(|err| translate(operation, err))?;
        let service = DataService::new(repo);
        f(&service).map_err(|err| translate(operation, err))
    }
}

fn translate(operation: &'static str, err: RepoError) -> EndpointError {
    match err {
        RepoError::Conflict { id, version } => {
            info!("event={operation} module=endpoint status=conflict id={id} version={version}");
            EndpointError::Conflict
        }
        RepoError::Validation(err) => {
            warn!("event={operation} module=endpoint status=rejected error_code=validation");
            EndpointError::InvalidRequest(err.to_string())
        }
        RepoError::InvalidFilter(message) => {
            warn!("event={operation} module=endpoint status=rejected error_code=invalid_filter");
            EndpointError::InvalidRequest(message)
        }
        other => {
            error!(
                "event={operation} module=endpoint status=error error_code=storage error={other}"
            );
            EndpointError::Storage(other.to_string())
        }
    }
}

/// Builds a validated page request from raw grid input.
pub fn page_request(page: u32, size: u32, sort: &[SortItem]) -> EndpointResult<PageRequest> {
    let request =
        PageRequest::of(page, size).map_err(|err| EndpointError::InvalidRequest(err.to_string()))?;
    let orders = sort
        .iter()
        .map(|item| -> EndpointResult<SortOrder> {
            let field = DataField::from_property(&item.property).ok_or_else(|| {
                EndpointError::InvalidRequest(format!(
                    "unknown sort property `{}`",
                    item.property
                ))
            })?;
            let direction = if item.ascending {
                Direction::Asc
            } else {
                Direction::Desc
            };
            Ok(SortOrder { field, direction })
        })
        .collect::<EndpointResult<Sort>>()?;
    Ok(request.with_sort(orders))
}

#[cfg(test)]
mod tests {
    use super::{page_request, DataEndpoint};
    use crate::api::{DataItem, EndpointError, SortItem, CONFLICT_MESSAGE};
    use ringlog_core::db::open_db;
    use ringlog_core::{Data, DataField, DataFilter, Direction};

    fn endpoint() -> (tempfile::TempDir, DataEndpoint) {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = DataEndpoint::new(dir.path().join("endpoint.db"));
        (dir, endpoint)
    }

    fn sort_by(property: &str, ascending: bool) -> Vec<SortItem> {
        vec![SortItem {
            property: property.to_string(),
            ascending,
        }]
    }

    #[test]
    fn update_conflict_is_translated_to_fixed_message() {
        let (_dir, endpoint) = endpoint();
        let item = DataItem {
            date: Some("2024-01-01".to_string()),
            moves: Some(1),
            ..DataItem::default()
        };
        let created = endpoint.update(&Data::try_from(item).unwrap()).unwrap();
        assert_eq!((created.id, created.version), (Some(1), 0));

        let mut edit = created.clone();
        edit.moves = Some(10);
        let updated = endpoint.update(&edit).unwrap();
        assert_eq!((updated.version, updated.moves), (1, Some(10)));

        let err = endpoint.update(&edit).unwrap_err();
        assert_eq!(err, EndpointError::Conflict);
        assert_eq!(err.to_string(), CONFLICT_MESSAGE);
        assert!(!err.to_string().contains("version 0"));
    }

    #[test]
    fn stale_update_at_max_version_is_a_conflict() {
        let (_dir, endpoint) = endpoint();
        let created = endpoint.update(&Data::new()).unwrap();

        let err = endpoint
            .update(&Data {
                version: i32::MAX,
                ..created
            })
            .unwrap_err();
        assert_eq!(err, EndpointError::Conflict);
    }

    #[test]
    fn get_missing_and_delete_missing_are_not_errors() {
        let (_dir, endpoint) = endpoint();
        assert_eq!(endpoint.get(12).unwrap(), None);
        endpoint.delete(12).unwrap();
        assert_eq!(endpoint.count().unwrap(), 0);
    }

    #[test]
    fn unopenable_database_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = DataEndpoint::new(dir.path());

        let err = endpoint.count().unwrap_err();
        assert!(matches!(err, EndpointError::Storage(_)), "got {err:?}");
        assert!(!err.is_conflict());
    }

    #[test]
    fn repository_failure_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.db");
        let endpoint = DataEndpoint::new(&path);
        endpoint.update(&Data::new()).unwrap();

        let conn = open_db(&path).unwrap();
        conn.execute("UPDATE data SET date = 'yesterday' WHERE id = 1;", [])
            .unwrap();
        drop(conn);

        let err = endpoint.get(1).unwrap_err();
        assert!(matches!(err, EndpointError::Storage(message) if message.contains("data.date")));
    }

    #[test]
    fn list_and_filter_go_through_service() {
        let (_dir, endpoint) = endpoint();
        for steps in [300, 100, 200] {
            let mut data = Data::new();
            data.steps = Some(steps);
            endpoint.update(&data).unwrap();
        }

        let request = page_request(0, 2, &sort_by("steps", true)).unwrap();
        let page = endpoint.list(&request).unwrap();
        let steps: Vec<_> = page.content.iter().map(|data| data.steps).collect();
        assert_eq!(steps, vec![Some(100), Some(200)]);
        assert_eq!(page.total_elements, 3);

        let filtered = endpoint
            .list_filtered(&request, &DataFilter::new().eq(DataField::Steps, 300))
            .unwrap();
        assert_eq!(filtered.total_elements, 1);

        let err = endpoint
            .list_filtered(&request, &DataFilter::new().eq(DataField::Date, 1_i64))
            .unwrap_err();
        assert!(matches!(err, EndpointError::InvalidRequest(_)));
    }

    #[test]
    fn page_request_rejects_unknown_property_and_zero_size() {
        let err = page_request(0, 10, &sort_by("heartRate", false)).unwrap_err();
        assert!(
            matches!(err, EndpointError::InvalidRequest(message) if message.contains("heartRate"))
        );

        assert!(matches!(
            page_request(0, 0, &[]),
            Err(EndpointError::InvalidRequest(_))
        ));

        let request = page_request(1, 5, &sort_by("date", false)).unwrap();
        assert_eq!(request.sort().orders()[0].direction, Direction::Desc);
        assert_eq!(request.offset(), 5);
    }
}
