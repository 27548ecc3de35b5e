//! Artifact persistence: object store backends and the run publisher.

pub mod error;
pub mod publisher;
pub mod store;

pub use {
    error::StorageError,
    publisher::ArtifactPublisher,
    store::{InMemoryStore, ObjectStore, S3Store},
};
