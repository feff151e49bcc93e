//! Object store abstraction for published artifacts
//!
//! Artifacts go either to an S3-compatible service or, for offline runs, to
//! a local directory laid out the same way.

mod local;
mod object_store;
mod s3_store;

pub use self::local::LocalObjectStore;
pub use self::object_store::{require_bucket, ObjectStoreProvider, StoredObjectInfo};
pub use self::s3_store::S3ObjectStore;
