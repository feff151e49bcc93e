//! Publishing of normalized tables as object-store artifacts

mod catalog;
mod encoding;
mod keys;
mod publisher;

pub use catalog::{build_catalog, CatalogEntry, LoadTarget, TableFamily};
pub use encoding::ArtifactEncoding;
pub use keys::{artifact_plan, plan_for, PlannedArtifact};
pub use publisher::{ArtifactPublisher, PublishedArtifact};
