//! Service layer for the content registry.
//! - `storage`: generic JSON-file-backed map.
//! - `file` / `db`: the two route store backends behind [`store::RouteStore`].
//! - `registry`: backend selection and fallback policy.

pub mod errors;
pub mod storage;
pub mod store;
pub mod file;
pub mod db;
pub mod registry;
#[cfg(test)]
pub mod test_support;

pub use registry::{Backend, RouteRegistry, Upserted};
pub use store::{RouteStore, StorageKind};
