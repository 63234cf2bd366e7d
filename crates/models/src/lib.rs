//! Domain model of the content registry: the record shape, the legacy
//! file-format migrator, and the relational entity that stores records.

pub mod errors;
pub mod db;
pub mod record;
pub mod legacy;
pub mod json_route;

pub use record::{normalize_route, ContentKind, ContentRecord, RouteContent};
