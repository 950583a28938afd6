//! Polynomials over GF(2) for the rolling Rabin fingerprint.
//!
//! A [`Pol`] stores one coefficient per bit of a `u64`: bit `i` is the
//! coefficient of x^i, so addition is XOR and multiplication is carryless.
//! The chunker needs one irreducible polynomial of degree 53 per store;
//! [`Pol::derive`] finds it by drawing candidates from a caller-supplied
//! byte stream (in practice a BLAKE3 XOF over the sharing secret, so the
//! polynomial is deterministic per passphrase).

use std::io::Read;

use crate::ChunkerError;

/// A polynomial over GF(2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pol(u64);

/// Candidates drawn from the seed stream before giving up.
const MAX_DERIVE_TRIES: usize = 1_000_000;

/// Degree of every derived polynomial. With the degree fixed, the rolling
/// fingerprint fits a `u64` with 8 bits to spare for the byte-at-a-time
/// reduction table.
pub const DERIVED_DEGREE: i32 = 53;

impl Pol {
    pub fn from_bits(bits: u64) -> Pol {
        Pol(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    /// Degree of the polynomial. The zero polynomial has degree -1.
    pub fn deg(self) -> i32 {
        63 - self.0.leading_zeros() as i32
    }

    fn add(self, rhs: Pol) -> Pol {
        Pol(self.0 ^ rhs.0)
    }

    /// Remainder of division by `m`. `m` must be nonzero.
    pub(crate) fn modulo(self, m: Pol) -> Pol {
        debug_assert!(m.0 != 0);
        let mut out = self;
        while out.deg() >= m.deg() {
            out = out.add(Pol(m.0 << (out.deg() - m.deg())));
        }
        out
    }

    fn gcd(self, other: Pol) -> Pol {
        if other.0 == 0 {
            return self;
        }
        if self.deg() < other.deg() {
            return other.gcd(self);
        }
        other.gcd(self.modulo(other))
    }

    /// (self * other) mod m, by shift-and-add over the bits of `other`.
    fn mulmod(self, other: Pol, m: Pol) -> Pol {
        let mut res = Pol(0);
        let mut a = self.modulo(m);
        let mut b = other.modulo(m).0;
        while b != 0 {
            if b & 1 == 1 {
                res = res.add(a);
            }
            b >>= 1;
            a = Pol(a.0 << 1).modulo(m);
        }
        res
    }

    /// x^(2^p) + x mod g, the Ben-Or test's probe polynomial.
    fn qp(p: u32, g: Pol) -> Pol {
        // x, squared p times
        let mut res = Pol(2).modulo(g);
        for _ in 0..p {
            res = res.mulmod(res, g);
        }
        res.add(Pol(2)).modulo(g)
    }

    /// Ben-Or irreducibility test: f of degree d is irreducible iff
    /// gcd(f, x^(2^i) + x mod f) = 1 for all i up to d/2.
    pub fn irreducible(self) -> bool {
        for i in 1..=(self.deg() / 2) {
            if self.gcd(Self::qp(i as u32, self)).0 > 1 {
                return false;
            }
        }
        true
    }

    /// Draw big-endian `u64` candidates from `seed`, mask them to degree
    /// 53 with a nonzero constant term, and return the first irreducible
    /// one. Fails only if the stream errors or one million candidates all
    /// test reducible.
    pub fn derive<R: Read>(seed: &mut R) -> Result<Pol, ChunkerError> {
        let mut buf = [0u8; 8];
        for _ in 0..MAX_DERIVE_TRIES {
            seed.read_exact(&mut buf)?;
            let mut bits = u64::from_be_bytes(buf);
            bits &= (1 << (DERIVED_DEGREE + 1)) - 1;
            bits |= (1 << DERIVED_DEGREE) | 1;
            let pol = Pol(bits);
            if pol.irreducible() {
                return Ok(pol);
            }
        }
        Err(ChunkerError::NoIrreduciblePolynomial)
    }
}
