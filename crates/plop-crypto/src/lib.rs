//! plop-crypto: convergent encryption for the plop object store.
//!
//! Pipeline: plaintext → keyed BLAKE3 id hash → prefix ∥ zstd compress →
//! XChaCha20-Poly1305 seal (nonce and AAD derived from the id hash) →
//! backend name boxed under a separate secret.
//!
//! Key hierarchy:
//! ```text
//! Sharing secret (256-bit, Argon2id from passphrase + fixed salt)
//!   ├── blob secret  (BLAKE3 derive-key, ".. blob cipher")   → AEAD key
//!   ├── name secret  (BLAKE3 derive-key, ".. object name boxing")
//!   ├── hash secret  (BLAKE3 derive-key, ".. blob hash for id")
//!   ├── nonce secret (BLAKE3 derive-key, ".. blob hash for nonce")
//!   └── chunker polynomial (BLAKE3 derive-key XOF, ".. rolling hash polynomial")
//! ```
//!
//! Everything is deterministic given the passphrase, which is the point:
//! identical plaintext under the same passphrase produces identical
//! ciphertext under an identical backend key, so equal data deduplicates
//! across stores and users without the backend seeing plaintext.

pub mod codec;
pub mod kdf;
pub mod keys;
pub mod names;

pub use codec::{
    Sealed, CACHE_CONTROL_V0, CONTENT_ENCODING_V0, CONTENT_TYPE_V0, PREFIX_BLOB, PREFIX_EXTENTS,
};
pub use kdf::{derive_sharing_secret, SharingSecret};
pub use keys::KeySchedule;

/// Size of every derived secret in bytes (256-bit).
pub const KEY_SIZE: usize = 32;

/// Size of an XChaCha20-Poly1305 nonce (192-bit).
pub const NONCE_SIZE: usize = 24;

/// Size of a plaintext hash (object identity) in bytes.
pub const HASH_SIZE: usize = 32;
