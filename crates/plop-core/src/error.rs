use thiserror::Error;

pub type PlopResult<T> = Result<T, PlopError>;

/// Stable error kinds surfaced to callers of the store.
///
/// The store never retries: transient failures surface as-is and retry
/// policy belongs to the caller. Authentication failures mean corruption
/// or a passphrase mismatch; retrying cannot fix either.
#[derive(Debug, Error)]
pub enum PlopError {
    /// The root key is not valid zbase32 or does not decode to 32 bytes.
    #[error("bad key")]
    BadKey,

    /// AEAD authentication failed, the authenticated type prefix did not
    /// match, or the extent list is malformed.
    #[error("blob is corrupted: {reason}")]
    CorruptBlob { reason: String },

    /// The backend declared a Content-Type other than the recognized
    /// version tag. Carries the observed value for diagnostics.
    #[error("unexpected Content-Type: {content_type:?}")]
    UnexpectedContentType { content_type: String },

    /// Backend failure, wrapped: transport errors and missing objects
    /// both surface here, with the adapter's message preserved.
    #[error("backend error: {0}")]
    Backend(String),

    /// zstd rejected the data while encoding or decoding.
    #[error("compression error: {0}")]
    Compression(#[source] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
