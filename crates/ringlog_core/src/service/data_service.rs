//! Data use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD/paging entry points for core callers.
//! - Delegate persistence to repository implementations one-to-one.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - The service holds no state besides its repository.
//! - Repository errors, including `RepoError::Conflict`, are returned
//!   unchanged; translation happens at the endpoint boundary.

use crate::model::data::{Data, DataId};
use crate::model::filter::DataFilter;
use crate::model::page::{Page, PageRequest};
use crate::repo::data_repo::{DataRepository, RepoResult};

/// Use-case service wrapper for data record operations.
pub struct DataService<R: DataRepository> {
    repo: R,
}

impl<R: DataRepository> DataService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Gets one record by id.
    pub fn get(&self, id: DataId) -> RepoResult<Option<Data>> {
        self.repo.find_by_id(id)
    }

    /// Inserts a new record or replaces an existing one.
    ///
    /// Fails with `RepoError::Conflict` when `data.version` is stale.
    pub fn update(&self, data: &Data) -> RepoResult<Data> {
        self.repo.save(data)
    }

    /// Deletes a record by id. Unknown ids succeed silently.
    pub fn delete(&self, id: DataId) -> RepoResult<()> {
        self.repo.delete_by_id(id)
    }

    pub fn list(&self, request: &PageRequest) -> RepoResult<Page<Data>> {
        self.repo.find_all(request)
    }

    pub fn list_filtered(
        &self,
        request: &PageRequest,
        filter: &DataFilter,
    ) -> RepoResult<Page<Data>> {
        self.repo.find_all_filtered(filter, request)
    }

    /// Counts all records, ignoring any filter.
    pub fn count(&self) -> RepoResult<u64> {
        self.repo.count()
    }
}
