//! Fiat-Shamir transcript for the proofs in this crate.
//!
//! The transcript is an append-only byte string. The prover and the verifier each create their own
//! empty transcript, append the canonical (compressed) encoding of the instance, then the
//! first-round messages, and hash the whole thing exactly once to get the challenge `e = H(bytes) mod q`.
//! A transcript should not be reused across proofs. Call [`ByteTranscript::reset`] or create a new one.

use crate::error::SigmaError;
use ark_ff::PrimeField;
use ark_serialize::CanonicalSerialize;
use ark_std::{io, io::Write, vec::Vec};
use digest::Digest;

/// Implemented by the public parts of a protocol (instances, first-round messages) that are
/// hashed into the challenge.
pub trait ChallengeContributor {
    fn challenge_contribution<W: Write>(&self, writer: W) -> Result<(), SigmaError>;
}

/// Accumulated bytes of one proving or verification run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteTranscript(Vec<u8>);

impl ByteTranscript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Start a transcript with caller chosen bytes, eg. a domain separator or a session id.
    /// Prover and verifier must use the same seed.
    pub fn with_seed(seed: &[u8]) -> Self {
        Self(seed.to_vec())
    }

    /// Append the canonical compressed encoding of `item`
    pub fn append<S: CanonicalSerialize>(&mut self, item: &S) -> Result<(), SigmaError> {
        item.serialize_compressed(&mut self.0)?;
        Ok(())
    }

    /// Hash everything appended so far to a scalar
    pub fn challenge<F: PrimeField, D: Digest>(&self) -> F {
        hash_to_scalar::<F, D>(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn reset(&mut self) {
        self.0.clear()
    }
}

impl Write for ByteTranscript {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// `D(bytes)` interpreted as a big-endian integer and reduced modulo the scalar field order.
/// Use a digest with output at least as long as the field, eg. `Sha256` for 256-bit curves or
/// `Blake2b512`, so that the reduction bias is negligible.
pub fn hash_to_scalar<F: PrimeField, D: Digest>(bytes: &[u8]) -> F {
    F::from_be_bytes_mod_order(&D::digest(bytes))
}
