//! Blob codec: one logical object to one backend ciphertext and back.
//!
//! Wire layout of a backend object body:
//! ```text
//! XChaCha20-Poly1305( prefix ∥ zstd(plaintext) ), AAD = id hash, nonce = KH(id hash)
//! ```
//! The 32-byte type prefix sits inside the AEAD plaintext but in front of
//! the compressor: it is authenticated, participates cheaply in the id
//! hash, and is checkable after decryption without running zstd.
//! Reordering prefix and compression changes the wire format.

use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::XNonce;

use plop_core::{PlopError, PlopResult};

use crate::keys::KeySchedule;
use crate::HASH_SIZE;

/// Content-Type of every stored object. All objects are superficially the
/// same type; the real type is only visible after opening the crypto. The
/// version number covers the crypto algorithm and plaintext format.
pub const CONTENT_TYPE_V0: &str = "application/x.org.bazil.plop.v0";

/// Objects never change once written.
pub const CACHE_CONTROL_V0: &str = "public, max-age=2147483648, immutable";

/// Bodies are stored exactly as uploaded.
pub const CONTENT_ENCODING_V0: &str = "identity";

/// Type prefixes, padded to exactly 32 bytes for 8-byte alignment. The
/// array type makes the length a compile-time fact.
pub const PREFIX_BLOB: &[u8; 32] = b"bazil.org/plop#type/blob/v1\x00\x00\x00\x00\x00";
pub const PREFIX_EXTENTS: &[u8; 32] = b"bazil.org/plop#type/extents/v1\x00\x00";

/// A sealed object ready for upload.
pub struct Sealed {
    /// Keyed hash of prefix ∥ plaintext: the object's identity.
    pub hash: [u8; HASH_SIZE],
    pub ciphertext: Vec<u8>,
}

impl KeySchedule {
    /// Seal one object. Deterministic: identical (prefix, plaintext)
    /// yields an identical hash and identical ciphertext.
    pub fn seal(&self, prefix: &'static [u8; 32], plaintext: &[u8]) -> PlopResult<Sealed> {
        let hash = self.hash_object(prefix, plaintext);
        let nonce = self.nonce(&hash);

        let compressed = zstd::encode_all(plaintext, 0).map_err(PlopError::Compression)?;
        let mut buf = Vec::with_capacity(prefix.len() + compressed.len());
        buf.extend_from_slice(prefix);
        buf.extend_from_slice(&compressed);

        let ciphertext = self
            .cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: &buf,
                    aad: &hash,
                },
            )
            .map_err(|_| anyhow::anyhow!("AEAD seal failed"))?;

        Ok(Sealed { hash, ciphertext })
    }

    /// Open one object fetched from the backend. The caller supplies the
    /// expected prefix and the plaintext hash it addressed the object by.
    pub fn open(
        &self,
        prefix: &'static [u8; 32],
        hash: &[u8; HASH_SIZE],
        ciphertext: &[u8],
    ) -> PlopResult<Vec<u8>> {
        let nonce = self.nonce(hash);
        let buf = self
            .cipher
            .decrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: ciphertext,
                    aad: hash,
                },
            )
            .map_err(|_| PlopError::CorruptBlob {
                reason: "AEAD open failed".into(),
            })?;

        let Some(compressed) = buf.strip_prefix(prefix.as_slice()) else {
            // authenticated already, so this is blob-vs-extents confusion
            // rather than tampering; report what was actually there
            let idx = buf
                .iter()
                .position(|&b| b == 0)
                .unwrap_or(0)
                .min(prefix.len());
            return Err(PlopError::CorruptBlob {
                reason: format!("wrong prefix: {:?}", String::from_utf8_lossy(&buf[..idx])),
            });
        };

        zstd::decode_all(compressed).map_err(PlopError::Compression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::SharingSecret;
    use crate::KEY_SIZE;
    use proptest::prelude::*;

    fn test_schedule() -> KeySchedule {
        KeySchedule::derive(&SharingSecret::from_bytes([42u8; KEY_SIZE])).unwrap()
    }

    #[test]
    fn seal_open_roundtrip() {
        let keys = test_schedule();
        let sealed = keys.seal(PREFIX_BLOB, b"hello, world\n").unwrap();
        let opened = keys.open(PREFIX_BLOB, &sealed.hash, &sealed.ciphertext).unwrap();
        assert_eq!(opened, b"hello, world\n");
    }

    #[test]
    fn seal_open_empty_plaintext() {
        let keys = test_schedule();
        let sealed = keys.seal(PREFIX_EXTENTS, b"").unwrap();
        let opened = keys
            .open(PREFIX_EXTENTS, &sealed.hash, &sealed.ciphertext)
            .unwrap();
        assert!(opened.is_empty());
    }

    #[test]
    fn sealing_is_convergent() {
        let keys = test_schedule();
        let a = keys.seal(PREFIX_BLOB, b"same bytes").unwrap();
        let b = keys.seal(PREFIX_BLOB, b"same bytes").unwrap();
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn tampered_ciphertext_is_corrupt() {
        let keys = test_schedule();
        let mut sealed = keys.seal(PREFIX_BLOB, b"secret data").unwrap();
        sealed.ciphertext[10] ^= 0x01;
        let err = keys
            .open(PREFIX_BLOB, &sealed.hash, &sealed.ciphertext)
            .unwrap_err();
        assert!(matches!(err, PlopError::CorruptBlob { .. }));
    }

    #[test]
    fn wrong_hash_fails_authentication() {
        let keys = test_schedule();
        let sealed = keys.seal(PREFIX_BLOB, b"data").unwrap();
        let wrong = keys.hash_object(PREFIX_BLOB, b"different");
        let err = keys.open(PREFIX_BLOB, &wrong, &sealed.ciphertext).unwrap_err();
        assert!(matches!(err, PlopError::CorruptBlob { .. }));
    }

    #[test]
    fn blob_opened_as_extents_reports_wrong_prefix() {
        let keys = test_schedule();
        let sealed = keys.seal(PREFIX_BLOB, b"chunk bytes").unwrap();
        // same hash (so decryption succeeds), wrong expected prefix
        let err = keys
            .open(PREFIX_EXTENTS, &sealed.hash, &sealed.ciphertext)
            .unwrap_err();
        match err {
            PlopError::CorruptBlob { reason } => {
                assert!(reason.contains("wrong prefix"), "got: {reason}");
                assert!(reason.contains("blob/v1"), "got: {reason}");
            }
            other => panic!("expected CorruptBlob, got {other:?}"),
        }
    }

    #[test]
    fn extents_opened_as_blob_reports_wrong_prefix() {
        let keys = test_schedule();
        let sealed = keys.seal(PREFIX_EXTENTS, b"").unwrap();
        let err = keys
            .open(PREFIX_BLOB, &sealed.hash, &sealed.ciphertext)
            .unwrap_err();
        match err {
            PlopError::CorruptBlob { reason } => {
                assert!(reason.contains("wrong prefix"), "got: {reason}")
            }
            other => panic!("expected CorruptBlob, got {other:?}"),
        }
    }

    #[test]
    fn compressible_data_shrinks() {
        let keys = test_schedule();
        let plaintext = vec![0u8; 64 * 1024];
        let sealed = keys.seal(PREFIX_BLOB, &plaintext).unwrap();
        assert!(sealed.ciphertext.len() < plaintext.len() / 4);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn roundtrip_arbitrary_data(data in proptest::collection::vec(any::<u8>(), 0..=16384)) {
            let keys = test_schedule();
            let sealed = keys.seal(PREFIX_BLOB, &data).unwrap();
            let opened = keys.open(PREFIX_BLOB, &sealed.hash, &sealed.ciphertext).unwrap();
            prop_assert_eq!(opened, data);
        }
    }
}
