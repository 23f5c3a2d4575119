//! Domain model for daily activity records.
//!
//! # Responsibility
//! - Define the single managed record and its optimistic-lock token.
//! - Define the field table, paging and filtering vocabulary shared by the
//!   repository, service and endpoint layers.
//!
//! # Invariants
//! - A persisted record is identified by a server-assigned `DataId`.
//! - Callers can only sort or filter on fields listed in `DataField::ALL`.

pub mod data;
pub mod field;
pub mod filter;
pub mod page;
