use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use plop_core::PlopError;

/// Errors a backend adapter reports. "Object not found" stays distinct
/// from transport failures at this level; the store's public surface
/// propagates both wrapped as [`PlopError::Backend`].
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("{0}")]
    Transport(String),
}

impl From<BackendError> for PlopError {
    fn from(err: BackendError) -> PlopError {
        PlopError::Backend(err.to_string())
    }
}

/// Metadata attached to every upload.
#[derive(Debug, Clone)]
pub struct PutOptions {
    pub content_type: String,
    pub content_encoding: String,
    pub cache_control: String,
}

type BodyFuture = Pin<Box<dyn Future<Output = Result<Bytes, BackendError>> + Send + 'static>>;

/// An opened object: the metadata the backend declared, with the body
/// fetched only when asked for.
///
/// Content-type and size come from the backend's metadata lookup, so a
/// caller can reject an object before paying for the body download.
pub struct ObjectReader {
    content_type: String,
    size: u64,
    body: BodyFuture,
}

impl ObjectReader {
    pub fn new(
        content_type: String,
        size: u64,
        body: impl Future<Output = Result<Bytes, BackendError>> + Send + 'static,
    ) -> Self {
        Self {
            content_type,
            size,
            body: Box::pin(body),
        }
    }

    /// Content-Type the backend declared for this object.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Body size in bytes the backend declared for this object.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Download the entire body.
    pub async fn read_all(self) -> Result<Bytes, BackendError> {
        self.body.await
    }
}

impl std::fmt::Debug for ObjectReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectReader")
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Capability set the store consumes from a blob backend.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written; keys are content-derived, so
///   re-putting a key always carries an identical body and `put` may
///   treat it as a no-op.
/// - "Object not found" is reported as [`BackendError::NotFound`],
///   distinct from transport failures.
/// - [`ObjectReader`] carries the declared content-type and size before
///   any body bytes move.
/// - The backend never interprets object bodies.
/// - Implementations are safe to share across concurrent tasks and must
///   not assume exclusive use.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Write an object with its declared metadata.
    async fn put(&self, key: &str, data: Bytes, opts: &PutOptions) -> Result<(), BackendError>;

    /// Open an object: metadata immediately, body on demand.
    async fn open(&self, key: &str) -> Result<ObjectReader, BackendError>;

    /// Enumerate keys. Intended for tests and diagnostics.
    async fn list(&self) -> Result<Vec<String>, BackendError>;
}
