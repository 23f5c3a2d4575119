//! Flutter-facing bindings for ringlog.
//!
//! `api` is the FRB input module. `endpoint` holds the record endpoint it
//! and the headless `editor` presenter share.

pub mod api;
pub mod editor;
pub mod endpoint;
