//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the record store contract used by the service layer.
//! - Isolate SQLite query details from service/endpoint orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Data::validate()` before persistence.
//! - Absence on read is `Ok(None)`; version mismatch on write is the only
//!   semantic write error (`RepoError::Conflict`).

pub mod data_repo;
