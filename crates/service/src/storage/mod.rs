//! Storage abstractions for service layer
//!
//! The file-backed map the local route store is built on.

pub mod json_map_store;
