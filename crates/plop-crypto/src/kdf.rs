//! Key derivation: Argon2id passphrase → sharing secret

use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroize;

use plop_core::PlopResult;

use crate::KEY_SIZE;

/// Salt for the Argon2id derivation. Obviously not secret (it cannot be),
/// but it forces attackers to target this format specifically instead of
/// reusing precomputed tables. Byte-identical across implementations.
pub const SHARING_SALT: &str = "bazil.org/plop 2020-04-07 sharing salt";

/// Argon2id cost parameters. Part of the shared-key contract: stores must
/// use identical costs to derive identical secrets, so these are not
/// configurable.
const ARGON2_TIME_COST: u32 = 1;
const ARGON2_MEM_COST_KIB: u32 = 64 * 1024;
const ARGON2_PARALLELISM: u32 = 4;

/// The 256-bit sharing secret derived from the passphrase.
///
/// Every other secret in the store derives from this. Zeroized on drop.
#[derive(Clone)]
pub struct SharingSecret {
    bytes: [u8; KEY_SIZE],
}

impl SharingSecret {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for SharingSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for SharingSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharingSecret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the sharing secret from a passphrase using Argon2id with the
/// fixed salt and costs.
pub fn derive_sharing_secret(passphrase: &SecretString) -> PlopResult<SharingSecret> {
    let params = Params::new(
        ARGON2_MEM_COST_KIB,
        ARGON2_TIME_COST,
        ARGON2_PARALLELISM,
        Some(KEY_SIZE),
    )
    .map_err(|e| anyhow::anyhow!("invalid Argon2id params: {e}"))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut bytes = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(
            passphrase.expose_secret().as_bytes(),
            SHARING_SALT.as_bytes(),
            &mut bytes,
        )
        .map_err(|e| anyhow::anyhow!("Argon2id KDF failed: {e}"))?;

    Ok(SharingSecret::from_bytes(bytes))
}
