//! zbase32 codec for object names and root keys.
//!
//! Backend lookups need deterministic names, so backend keys are keyed
//! hashes of the plaintext hash ("boxed" under the name secret, see
//! [`KeySchedule::box_name`](crate::KeySchedule::box_name)) and root keys
//! are the plaintext hash itself. Both are encoded with z-base-32, a
//! human-friendly, case-insensitive base-32 alphabet; 32-byte values
//! encode to 52 lowercase characters.

use data_encoding::Encoding;
use data_encoding_macro::new_encoding;

use plop_core::{PlopError, PlopResult};

use crate::HASH_SIZE;

/// z-base-32: no padding, uppercase folded to lowercase on decode.
pub const ZBASE32: Encoding = new_encoding! {
    symbols: "ybndrfg8ejkmcpqxot1uwisza345h769",
    translate_from: "YBNDRFGEJKMCPQXOTUWISZAH",
    translate_to: "ybndrfgejkmcpqxotuwiszah",
};

/// Length of an encoded 32-byte key.
pub const ENCODED_KEY_LEN: usize = 52;

pub fn encode(raw: &[u8]) -> String {
    ZBASE32.encode(raw)
}

/// Decode an external root key. Anything that is not valid zbase32 for
/// exactly 32 bytes is a bad key.
pub fn decode_key(key: &str) -> PlopResult<[u8; HASH_SIZE]> {
    let raw = ZBASE32.decode(key.as_bytes()).map_err(|_| PlopError::BadKey)?;
    raw.try_into().map_err(|_| PlopError::BadKey)
}
