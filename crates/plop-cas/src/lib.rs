//! plop-cas: content-addressed storage with convergent encryption.
//!
//! Data goes into a backing blob store chunked, compressed, and sealed
//! with XChaCha20-Poly1305; every key involved derives from one
//! caller-supplied passphrase. Objects with identical contents under the
//! same passphrase get identical backend keys and identical ciphertexts,
//! so equal data deduplicates across stores and users without the backend
//! ever seeing plaintext. What comes back out is a short opaque root key;
//! presenting it later reconstructs the byte stream, including random
//! access.
//!
//! Limitations (at this level): no key rotation, no garbage collection.
//!
//! Cancellation: every operation is an `async fn`; dropping its future
//! abandons the in-flight backend call. A [`Handle`] retains nothing from
//! the `open` call that produced it; each read is driven entirely by its
//! own future.

pub mod extent;
pub mod handle;
pub mod store;

pub use handle::{Handle, SequentialReader};
pub use store::{Store, Writer};
