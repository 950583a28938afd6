//! plop-storage: backend adapter over S3-compatible object stores.
//!
//! The store core consumes the narrow [`Backend`] capability set: put an
//! immutable object with declared metadata, open one back (metadata
//! first, body on demand), enumerate keys. [`MemoryBackend`] is the
//! in-process test double; [`S3Backend`] adapts an OpenDAL operator.

pub mod backend;
pub mod memory;
pub mod s3;

pub use backend::{Backend, BackendError, ObjectReader, PutOptions};
pub use memory::MemoryBackend;
pub use s3::{build_operator, S3Backend};
