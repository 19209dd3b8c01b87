#![cfg_attr(not(feature = "std"), no_std)]

//! Sigma protocols used when escrowing an ECDSA-style signature under twisted ElGamal encryption.
//!
//! - [`equality_linking`] proves that the plaintext of a ciphertext `(V, U)` is the scalar `v` with `A = R * v`,
//!   where `R` and `A` come from a signature. Encrypting the signature's `s` this way lets anyone check that
//!   the escrowed value really completes the signature without learning it.
//! - [`binary_value`] proves that a ciphertext encrypts 0 or 1 without revealing which.
//! - [`twisted_elgamal`] has the encryption, including splitting a scalar into small limbs that are encrypted
//!   separately and recombined homomorphically, so that decryption only needs a bounded discrete log.
//!
//! All proofs are non-interactive using Fiat-Shamir over a [`ByteTranscript`]. The prover and the verifier
//! each start a fresh transcript (or one seeded with the same bytes), and the transcript's digest is a type
//! parameter, eg. `Sha256` or `Blake2b512`.
//!
//! Each protocol can also be run step by step, `XProtocol::init` then `challenge_contribution` then
//! `gen_proof`, when the challenge is derived from a larger transcript.

pub mod binary_value;
pub mod context;
pub mod equality_linking;
pub mod error;
pub mod transcript;
pub mod twisted_elgamal;

pub use binary_value::{
    BinaryValueInstance, BinaryValueParams, BinaryValueProof, BinaryValueProtocol,
    BinaryValueWitness,
};
pub use context::{CryptoContext, GeneratorAssignment};
pub use equality_linking::{
    EqualityLinkingInstance, EqualityLinkingParams, EqualityLinkingProof, EqualityLinkingProtocol,
    EqualityLinkingWitness,
};
pub use error::SigmaError;
pub use transcript::{ByteTranscript, ChallengeContributor};

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, SerializationError};
use ark_std::vec::Vec;

/// Canonical byte encoding of proofs and the other public objects: points compressed, scalars as
/// fixed size little-endian integers, fields in declaration order.
pub trait ProofEncoding: CanonicalSerialize + CanonicalDeserialize {
    fn to_bytes(&self) -> Result<Vec<u8>, SigmaError> {
        let mut bytes = Vec::with_capacity(self.compressed_size());
        self.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }

    /// Decodes and validates, so points must be in the prime order subgroup and scalars less than
    /// the group order. Trailing bytes are an error.
    fn from_bytes(bytes: &[u8]) -> Result<Self, SigmaError> {
        let mut reader = bytes;
        let obj = Self::deserialize_compressed(&mut reader)?;
        if !reader.is_empty() {
            return Err(SerializationError::InvalidData.into());
        }
        Ok(obj)
    }

    fn encoded_size(&self) -> usize {
        self.compressed_size()
    }
}

impl<T: CanonicalSerialize + CanonicalDeserialize> ProofEncoding for T {}
