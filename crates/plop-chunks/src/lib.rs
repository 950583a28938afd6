//! plop-chunks: content-defined chunking for the plop object store.
//!
//! Splits a byte stream into variable-size chunks whose boundaries are
//! determined by a rolling Rabin fingerprint over the content, so edits
//! shift only nearby boundaries and unchanged data keeps its chunks (and
//! therefore its backend objects). The fingerprint is parameterized by an
//! irreducible polynomial derived per store; two stores with the same
//! polynomial cut identical inputs identically, which is what makes
//! cross-store deduplication work.
//!
//! This crate deliberately stays narrow: it transforms bytes into chunk
//! boundaries. Hashing, encryption, and upload live elsewhere.

pub mod chunker;
pub mod pol;

pub use chunker::{Chunker, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE, SPLIT_MASK, WINDOW_SIZE};
pub use pol::Pol;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChunkerError {
    /// The seed stream ran out of candidates without producing an
    /// irreducible polynomial. Astronomically rare for random seeds.
    #[error("no irreducible polynomial found in seed stream")]
    NoIrreduciblePolynomial,

    #[error("seed stream error: {0}")]
    Seed(#[from] std::io::Error),
}
