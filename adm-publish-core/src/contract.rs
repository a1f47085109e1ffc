//! # contract: seams between the publish pipeline and the outside world
//!
//! The pipeline talks to two external collaborators, both behind a trait:
//!
//! - [`ObjectStore`]: key-addressed durable storage (an S3 bucket in production).
//! - [`Announcer`]: notifies a downstream API that a new version was published.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall` so tests can assert on exactly
//!   what was written and how often the announcer was called.
//! - Mocks are exported under the default `test-export-mocks` feature so the
//!   integration tests of this and dependent crates can use them.
//!
//! ## Adding New Stores
//! - Implement [`ObjectStore`] for the destination.
//! - Map every rejected write to [`PublishError::Storage`](crate::error::PublishError::Storage) with the bucket and key;
//!   the pipeline never inspects the error further.

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::Result;

/// A single object write: where it goes, what it contains, how it is labeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

/// Acknowledgment returned by the store after a write.
///
/// Only used for diagnostics; nothing downstream branches on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutReceipt {
    pub request_id: Option<String>,
    pub e_tag: Option<String>,
    pub version_id: Option<String>,
}

/// An object read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

/// Trait for writing and reading objects in a bucket.
/// The implementor is responsible for connecting to the backing storage API.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object, replacing any existing object under the same key.
    async fn put_object(&self, req: PutObject) -> Result<PutReceipt>;

    /// Read an object back.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject>;
}

/// Outcome of a version announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    /// Endpoint or key not configured; no request was made.
    Skipped,
    /// The remote accepted the announcement with this status code.
    Delivered { status: u16 },
}

/// Trait for telling a downstream system that a version is now available.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn announce(&self, version: &str) -> Result<Announcement>;
}
