//! Key schedule: sharing secret → domain-separated object secrets

use chacha20poly1305::{KeyInit, XChaCha20Poly1305};
use zeroize::Zeroize;

use plop_chunks::Pol;
use plop_core::PlopResult;

use crate::kdf::SharingSecret;
use crate::{names, HASH_SIZE, KEY_SIZE, NONCE_SIZE};

/// Domain-separation contexts for BLAKE3 derive-key. These are part of the
/// wire format: a single changed byte diverges every derived key.
const CONTEXT_BLOB_CIPHER: &str = "bazil.org/plop 2020-04-07 blob cipher";
const CONTEXT_NAME_BOXING: &str = "bazil.org/plop 2020-04-07 object name boxing";
const CONTEXT_ID_HASH: &str = "bazil.org/plop 2020-04-07 blob hash for id";
const CONTEXT_NONCE_HASH: &str = "bazil.org/plop 2020-04-07 blob hash for nonce";
const CONTEXT_CHUNKER_POLYNOMIAL: &str = "bazil.org/plop 2020-04-07 rolling hash polynomial";

/// Everything a store derives from one sharing secret: the keyed-hash
/// secrets, the AEAD instance, and the chunker polynomial.
///
/// Immutable after construction and safe to share across tasks.
pub struct KeySchedule {
    name_secret: [u8; KEY_SIZE],
    hash_secret: [u8; KEY_SIZE],
    nonce_secret: [u8; KEY_SIZE],
    pub(crate) cipher: XChaCha20Poly1305,
    polynomial: Pol,
}

impl KeySchedule {
    /// Derive the full schedule. Fails only if the polynomial derivation
    /// exhausts its candidate budget, which is astronomically rare.
    pub fn derive(sharing: &SharingSecret) -> PlopResult<KeySchedule> {
        let blob_secret = blake3::derive_key(CONTEXT_BLOB_CIPHER, sharing.as_bytes());

        // Same polynomial for every store using this sharing secret, so
        // chunk boundaries line up and deduplication works across stores.
        let mut xof = blake3::Hasher::new_derive_key(CONTEXT_CHUNKER_POLYNOMIAL)
            .update(sharing.as_bytes())
            .finalize_xof();
        let polynomial =
            Pol::derive(&mut xof).map_err(|e| anyhow::anyhow!("derive chunker polynomial: {e}"))?;

        Ok(KeySchedule {
            name_secret: blake3::derive_key(CONTEXT_NAME_BOXING, sharing.as_bytes()),
            hash_secret: blake3::derive_key(CONTEXT_ID_HASH, sharing.as_bytes()),
            nonce_secret: blake3::derive_key(CONTEXT_NONCE_HASH, sharing.as_bytes()),
            cipher: XChaCha20Poly1305::new((&blob_secret).into()),
            polynomial,
        })
    }

    /// The content-defined chunking polynomial for this schedule.
    pub fn polynomial(&self) -> Pol {
        self.polynomial
    }

    /// Keyed plaintext fingerprint over prefix ∥ data: the object's
    /// identity, and the AEAD associated data.
    pub(crate) fn hash_object(&self, prefix: &[u8; 32], data: &[u8]) -> [u8; HASH_SIZE] {
        let mut h = blake3::Hasher::new_keyed(&self.hash_secret);
        h.update(prefix);
        h.update(data);
        *h.finalize().as_bytes()
    }

    /// Per-object nonce, derived from the plaintext hash. Nonce reuse can
    /// only occur for identical plaintexts, which produce identical
    /// ciphertexts anyway; a random nonce here would break deduplication.
    pub(crate) fn nonce(&self, hash: &[u8; HASH_SIZE]) -> [u8; NONCE_SIZE] {
        let mut h = blake3::Hasher::new_keyed(&self.nonce_secret);
        h.update(hash);
        let mut nonce = [0u8; NONCE_SIZE];
        h.finalize_xof().fill(&mut nonce);
        nonce
    }

    /// Box a plaintext hash under the name secret and encode it as the
    /// backend key. The backend only ever sees boxed names, so it cannot
    /// correlate them with root keys handed to recipients.
    pub fn box_name(&self, hash: &[u8; HASH_SIZE]) -> String {
        let mut h = blake3::Hasher::new_keyed(&self.name_secret);
        h.update(hash);
        names::encode(h.finalize().as_bytes())
    }
}

impl Drop for KeySchedule {
    fn drop(&mut self) {
        self.name_secret.zeroize();
        self.hash_secret.zeroize();
        self.nonce_secret.zeroize();
    }
}

impl std::fmt::Debug for KeySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySchedule")
            .field("secrets", &"[REDACTED]")
            .field("polynomial", &self.polynomial)
            .finish()
    }
}
