//! Core use-case services.
//!
//! # Responsibility
//! - Present a storage-independent API to endpoint and editor callers.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod data_service;
