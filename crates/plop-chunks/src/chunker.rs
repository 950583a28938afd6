//! Streaming content-defined chunker.
//!
//! A 64-bit Rabin fingerprint rolls over a 64-byte window; a chunk ends
//! where the low bits of the fingerprint are all zero (once the minimum
//! size is reached) or at the hard maximum. Boundaries depend only on the
//! polynomial and the input bytes, never on how the input is fed in.
//!
//! The size parameters below are part of the on-disk format: changing any
//! of them moves chunk boundaries and defeats deduplication against
//! existing stores.

use crate::pol::Pol;

/// Sliding window width in bytes.
pub const WINDOW_SIZE: usize = 64;
/// Smallest chunk the chunker will cut (the final chunk of a stream may be
/// shorter).
pub const MIN_CHUNK_SIZE: usize = 512 * 1024;
/// Hard upper bound; a boundary is forced at this size.
pub const MAX_CHUNK_SIZE: usize = 8 * 1024 * 1024;
/// Low fingerprint bits that must be zero at a boundary (~1 MiB average
/// chunks).
pub const SPLIT_MASK: u64 = (1 << 20) - 1;

/// Per-polynomial lookup tables.
///
/// `out[b]` is the fingerprint of byte `b` followed by `WINDOW_SIZE - 1`
/// zero bytes: XORing it removes `b`'s contribution the moment it leaves
/// the window. `modt[b]` combines the unreduced top byte with its
/// reduction mod the polynomial, so appending a byte is one shift and one
/// XOR.
struct Tables {
    out: [u64; 256],
    modt: [u64; 256],
}

fn append_byte(fingerprint: u64, b: u8, pol: Pol) -> u64 {
    let h = (fingerprint << 8) | u64::from(b);
    Pol::from_bits(h).modulo(pol).bits()
}

impl Tables {
    fn new(pol: Pol) -> Tables {
        let mut out = [0u64; 256];
        let mut modt = [0u64; 256];
        for b in 0..256usize {
            let mut h = append_byte(0, b as u8, pol);
            for _ in 0..WINDOW_SIZE - 1 {
                h = append_byte(h, 0, pol);
            }
            out[b] = h;
        }
        let deg = pol.deg() as u32;
        for b in 0..256u64 {
            modt[b as usize] = Pol::from_bits(b << deg).modulo(pol).bits() | (b << deg);
        }
        Tables { out, modt }
    }
}

/// Streaming chunker: feed bytes with [`push`](Chunker::push), collect the
/// final short chunk with [`finish`](Chunker::finish).
pub struct Chunker {
    tables: Tables,
    pol_shift: u32,
    min_size: usize,
    max_size: usize,
    split_mask: u64,
    window: [u8; WINDOW_SIZE],
    wpos: usize,
    digest: u64,
    chunk: Vec<u8>,
}

impl Chunker {
    /// Chunker with the store-format boundaries.
    pub fn new(pol: Pol) -> Chunker {
        Chunker::with_boundaries(pol, MIN_CHUNK_SIZE, MAX_CHUNK_SIZE, SPLIT_MASK)
    }

    /// Chunker with explicit boundaries. Non-default boundaries produce
    /// chunks incompatible with the store format; useful for tests.
    pub fn with_boundaries(pol: Pol, min_size: usize, max_size: usize, split_mask: u64) -> Chunker {
        assert!(pol.deg() > 8, "polynomial degree must exceed one byte");
        assert!(min_size >= WINDOW_SIZE);
        assert!(max_size >= min_size);
        let mut c = Chunker {
            tables: Tables::new(pol),
            pol_shift: pol.deg() as u32 - 8,
            min_size,
            max_size,
            split_mask,
            window: [0; WINDOW_SIZE],
            wpos: 0,
            digest: 0,
            chunk: Vec::new(),
        };
        c.start_chunk();
        c
    }

    fn start_chunk(&mut self) {
        self.window = [0; WINDOW_SIZE];
        self.wpos = 0;
        self.digest = 0;
        self.slide(1);
    }

    fn slide(&mut self, b: u8) {
        let out = self.window[self.wpos];
        self.window[self.wpos] = b;
        self.digest ^= self.tables.out[out as usize];
        self.wpos = (self.wpos + 1) % WINDOW_SIZE;
        let index = (self.digest >> self.pol_shift) as usize;
        self.digest = (self.digest << 8) | u64::from(b);
        self.digest ^= self.tables.modt[index];
    }

    /// Feed input bytes; returns the chunks completed by this call, in
    /// order. Splitting the same input across any number of `push` calls
    /// yields the same chunks.
    pub fn push(&mut self, data: &[u8]) -> Vec<Vec<u8>> {
        let mut complete = Vec::new();
        for &b in data {
            self.slide(b);
            self.chunk.push(b);
            let len = self.chunk.len();
            if len >= self.max_size || (len >= self.min_size && self.digest & self.split_mask == 0)
            {
                complete.push(std::mem::take(&mut self.chunk));
                self.start_chunk();
            }
        }
        complete
    }

    /// End of stream: the pending partial chunk, if any bytes remain.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.chunk.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.chunk))
        }
    }
}
