//! Extent records: fixed 40-byte entries locating chunks in a logical
//! file.
//!
//! Each record is a big-endian `u64` *end* offset followed by the 32-byte
//! plaintext hash of the chunk's blob object. The first extent implicitly
//! starts at 0, the last extent doubles as the file size, and a zero-byte
//! file has no extents at all.

use plop_core::{PlopError, PlopResult};

/// Bytes per record: offset plus hash.
pub const EXTENT_SIZE: usize = 8 + 32;

/// One chunk's position within the logical file. The chunk covers
/// `[start, end)` where `start` is the previous extent's `end`, or 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub end: u64,
    pub hash: [u8; 32],
}

/// Append one record to an extent list under construction.
pub fn append_extent(buf: &mut Vec<u8>, end: u64, hash: &[u8; 32]) {
    buf.extend_from_slice(&end.to_be_bytes());
    buf.extend_from_slice(hash);
}

/// Parse and validate an extent list payload.
pub fn parse_extents(data: &[u8]) -> PlopResult<Vec<Extent>> {
    if data.len() % EXTENT_SIZE != 0 {
        return Err(PlopError::CorruptBlob {
            reason: format!(
                "extent list length {} is not a multiple of {EXTENT_SIZE}",
                data.len()
            ),
        });
    }

    let mut extents = Vec::with_capacity(data.len() / EXTENT_SIZE);
    let mut prev = 0u64;
    for record in data.chunks_exact(EXTENT_SIZE) {
        let end = u64::from_be_bytes(record[..8].try_into().expect("record is 40 bytes"));
        if end <= prev {
            return Err(PlopError::CorruptBlob {
                reason: format!("extent end offsets not strictly increasing: {end} after {prev}"),
            });
        }
        prev = end;

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&record[8..]);
        extents.push(Extent { end, hash });
    }
    Ok(extents)
}
