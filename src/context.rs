//! Public group context shared by every proof.
//!
//! The context fixes the two generators used by the twisted ElGamal encryption and by both
//! protocols. `generator` is the curve's canonical generator and `aux_generator` is obtained by
//! hashing a public label to the curve, so its discrete log with respect to `generator` is unknown
//! to everyone. That unknown relation is what makes commitments `g^m·h^r` hiding and binding.
//!
//! Create the context once, at startup, and pass it by reference. It is never mutated afterwards.

use ark_ec::AffineRepr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use digest::Digest;
use dock_crypto_utils::{
    hashing_utils::affine_group_elem_from_try_and_incr, serde_utils::ArkObjectBytes,
};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use tracing::debug;

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct CryptoContext<G: AffineRepr> {
    /// Primary generator, the encryption's `g`
    #[serde_as(as = "ArkObjectBytes")]
    pub generator: G,
    /// Auxiliary generator, the encryption's `h`. The message is encoded in its exponent.
    #[serde_as(as = "ArkObjectBytes")]
    pub aux_generator: G,
}

/// Which context generator plays the role of `g` and which plays `h` in a protocol's public
/// parameters. Two orderings of the equality-linking setup exist and they produce incompatible
/// proofs, so the choice is always explicit.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum GeneratorAssignment {
    /// `g = aux_generator`, `h = generator`. Canonical for the equality-linking proof: with it the
    /// committed value sits on the auxiliary generator exactly as in a twisted ElGamal ciphertext.
    #[default]
    AuxiliaryFirst,
    /// `g = generator`, `h = aux_generator`
    PrimaryFirst,
}

impl<G: AffineRepr> CryptoContext<G> {
    /// Use the curve's generator as primary and derive the auxiliary generator from `label`
    pub fn new<D: Digest>(label: &[u8]) -> Self {
        let mut bytes = label.to_vec();
        bytes.extend_from_slice(b" : H");
        let aux_generator = affine_group_elem_from_try_and_incr::<G, D>(&bytes);
        Self::from_generators(G::generator(), aux_generator)
    }

    /// Caller supplies both generators, eg. to interoperate with an existing deployment. The caller
    /// is responsible for the discrete log relation between them being unknown.
    pub fn from_generators(generator: G, aux_generator: G) -> Self {
        debug!(stage = "setup", %generator, %aux_generator, "crypto context ready");
        Self {
            generator,
            aux_generator,
        }
    }

    /// Returns `(g, h)` as per `assignment`
    pub fn generators(&self, assignment: GeneratorAssignment) -> (G, G) {
        match assignment {
            GeneratorAssignment::AuxiliaryFirst => (self.aux_generator, self.generator),
            GeneratorAssignment::PrimaryFirst => (self.generator, self.aux_generator),
        }
    }
}
