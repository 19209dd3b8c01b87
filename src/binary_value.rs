//! Proof that a twisted ElGamal ciphertext encrypts either 0 or 1, without revealing which.
//!
//! Public: parameters `g` (primary) and `h` (auxiliary) and the instance `(ek, U, V)` where `U = g * r + h * b`
//! and `V = ek * r`. The prover knows `r` and the bit `b`. This is an OR of two discrete log
//! equality proofs:
//! - branch 0: `log_g(U) == log_ek(V)`, true when `b = 0`
//! - branch 1: `log_g(U - h) == log_ek(V)`, true when `b = 1`
//!
//! The prover runs the real branch honestly and simulates the other by choosing its challenge
//! share and response first. The Fiat-Shamir challenge `x` then fixes the real branch's share as
//! `x` minus the simulated share. Let `c0 = U` and `c1 = U - h`. For each branch `i` the proof carries
//! commitments `(Y_g, Y_ek)`, a challenge share `beta_i` and a response `omega_i` with
//! `Y_g = g * omega_i - c_i * beta_i` and `Y_ek = ek * omega_i - V * beta_i`, and the verifier also
//! checks `beta_0 + beta_1 == x`. Both branches are structurally identical, and the shares and
//! responses are uniformly distributed whichever bit was encrypted.
//!
//! Fields are named 1 for branch 0 and 2 for branch 1, so branch 0 is `(Y1, Y2, beta1, omega1)`
//! and branch 1 is `(Y3, Y4, beta2, omega2)`.

use crate::{
    context::CryptoContext,
    error::SigmaError,
    transcript::{ByteTranscript, ChallengeContributor},
    twisted_elgamal::{TwistedElGamalCiphertext, TwistedElGamalPublicKey},
};
use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{fmt, io::Write, rand::RngCore, UniformRand};
use digest::Digest;
use dock_crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use tracing::{debug, instrument, trace};
use zeroize::{Zeroize, ZeroizeOnDrop};

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct BinaryValueParams<G: AffineRepr> {
    /// Base of the randomness, the context's primary generator
    #[serde_as(as = "ArkObjectBytes")]
    pub g: G,
    /// Base of the bit, the context's auxiliary generator
    #[serde_as(as = "ArkObjectBytes")]
    pub h: G,
}

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct BinaryValueInstance<G: AffineRepr> {
    #[serde_as(as = "ArkObjectBytes")]
    pub ek: G,
    /// `g * r + h * b`
    #[serde_as(as = "ArkObjectBytes")]
    pub u: G,
    /// `ek * r`
    #[serde_as(as = "ArkObjectBytes")]
    pub v: G,
}

/// Randomness of the encryption. The bit itself is chosen by calling `prove_zero` or `prove_one`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BinaryValueWitness<F: PrimeField> {
    pub r: F,
}

/// Prover's state after the first round
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BinaryValueProtocol<G: AffineRepr> {
    #[zeroize(skip)]
    pub y1: G,
    #[zeroize(skip)]
    pub y2: G,
    #[zeroize(skip)]
    pub y3: G,
    #[zeroize(skip)]
    pub y4: G,
    /// `true` if the real branch is branch 1, i.e. the encrypted bit is 1
    real_is_one: bool,
    blinding: G::ScalarField,
    simulated_challenge: G::ScalarField,
    simulated_response: G::ScalarField,
    witness: G::ScalarField,
}

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct BinaryValueProof<G: AffineRepr> {
    #[serde_as(as = "ArkObjectBytes")]
    pub y1: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub y2: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub y3: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub y4: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub beta1: G::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub beta2: G::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub omega1: G::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub omega2: G::ScalarField,
}

impl<G: AffineRepr> BinaryValueParams<G> {
    pub fn new(ctx: &CryptoContext<G>) -> Self {
        debug!(stage = "setup", g = %ctx.generator, h = %ctx.aux_generator, "binary value params");
        Self {
            g: ctx.generator,
            h: ctx.aux_generator,
        }
    }
}

impl<G: AffineRepr> BinaryValueInstance<G> {
    pub fn new(ek: G, u: G, v: G) -> Self {
        Self { ek, u, v }
    }

    pub fn from_ciphertext(
        public_key: &TwistedElGamalPublicKey<G>,
        ciphertext: &TwistedElGamalCiphertext<G>,
    ) -> Self {
        Self::new(public_key.0, ciphertext.y, ciphertext.x)
    }

    /// Whether the instance is an encryption of `bit` with the witness' randomness
    pub fn encrypts_bit(
        &self,
        params: &BinaryValueParams<G>,
        witness: &BinaryValueWitness<G::ScalarField>,
        bit: bool,
    ) -> bool {
        let mut u = params.g * witness.r;
        if bit {
            u += params.h;
        }
        u.into_affine() == self.u && (self.ek * witness.r).into_affine() == self.v
    }

    /// `U - h`, the first element of branch 1's statement
    fn shifted_u(&self, params: &BinaryValueParams<G>) -> G {
        (self.u.into_group() - params.h).into_affine()
    }
}

impl<G: AffineRepr> ChallengeContributor for BinaryValueInstance<G> {
    /// Writes `ek || U || V`
    fn challenge_contribution<W: Write>(&self, mut writer: W) -> Result<(), SigmaError> {
        self.ek.serialize_compressed(&mut writer)?;
        self.u.serialize_compressed(&mut writer)?;
        self.v.serialize_compressed(&mut writer)?;
        Ok(())
    }
}

impl<F: PrimeField> BinaryValueWitness<F> {
    pub fn new(r: F) -> Self {
        Self { r }
    }
}

impl<F: PrimeField> fmt::Debug for BinaryValueWitness<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BinaryValueWitness(<redacted>)")
    }
}

/// Commitments of a simulated branch, `(g * omega - c * beta, ek * omega - V * beta)`
fn simulated_commitments<G: AffineRepr>(
    g: G,
    c: G,
    ek: G,
    v: G,
    beta: G::ScalarField,
    omega: G::ScalarField,
) -> (G::Group, G::Group) {
    (
        G::Group::msm_unchecked(&[g, c], &[omega, -beta]),
        G::Group::msm_unchecked(&[ek, v], &[omega, -beta]),
    )
}

impl<G: AffineRepr> BinaryValueProtocol<G> {
    /// Start a proof that the instance encrypts 0
    pub fn init_zero<R: RngCore>(
        rng: &mut R,
        params: &BinaryValueParams<G>,
        instance: &BinaryValueInstance<G>,
        witness: &BinaryValueWitness<G::ScalarField>,
    ) -> Self {
        Self::init(rng, params, instance, witness, false)
    }

    /// Start a proof that the instance encrypts 1
    pub fn init_one<R: RngCore>(
        rng: &mut R,
        params: &BinaryValueParams<G>,
        instance: &BinaryValueInstance<G>,
        witness: &BinaryValueWitness<G::ScalarField>,
    ) -> Self {
        Self::init(rng, params, instance, witness, true)
    }

    fn init<R: RngCore>(
        rng: &mut R,
        params: &BinaryValueParams<G>,
        instance: &BinaryValueInstance<G>,
        witness: &BinaryValueWitness<G::ScalarField>,
        real_is_one: bool,
    ) -> Self {
        let blinding = G::ScalarField::rand(rng);
        let simulated_challenge = G::ScalarField::rand(rng);
        let simulated_response = G::ScalarField::rand(rng);

        let real = (params.g * blinding, instance.ek * blinding);
        let simulated = if real_is_one {
            // Branch 0 is simulated against `U`
            simulated_commitments(
                params.g,
                instance.u,
                instance.ek,
                instance.v,
                simulated_challenge,
                simulated_response,
            )
        } else {
            // Branch 1 is simulated against `U - h`
            simulated_commitments(
                params.g,
                instance.shifted_u(params),
                instance.ek,
                instance.v,
                simulated_challenge,
                simulated_response,
            )
        };
        let (branch0, branch1) = if real_is_one {
            (simulated, real)
        } else {
            (real, simulated)
        };
        let y = G::Group::normalize_batch(&[branch0.0, branch0.1, branch1.0, branch1.1]);
        debug!(
            stage = "commit",
            y1 = %y[0],
            y2 = %y[1],
            y3 = %y[2],
            y4 = %y[3],
            "binary value commitments"
        );
        Self {
            y1: y[0],
            y2: y[1],
            y3: y[2],
            y4: y[3],
            real_is_one,
            blinding,
            simulated_challenge,
            simulated_response,
            witness: witness.r,
        }
    }

    pub fn challenge_contribution<W: Write>(
        &self,
        instance: &BinaryValueInstance<G>,
        writer: W,
    ) -> Result<(), SigmaError> {
        BinaryValueProof::compute_challenge_contribution(
            instance, &self.y1, &self.y2, &self.y3, &self.y4, writer,
        )
    }

    /// Real branch's challenge share is `challenge` minus the simulated one and its response is
    /// `share * r + blinding`
    pub fn gen_proof(self, challenge: &G::ScalarField) -> BinaryValueProof<G> {
        let real_challenge = *challenge - self.simulated_challenge;
        let real_response = real_challenge * self.witness + self.blinding;
        let ((beta1, omega1), (beta2, omega2)) = if self.real_is_one {
            (
                (self.simulated_challenge, self.simulated_response),
                (real_challenge, real_response),
            )
        } else {
            (
                (real_challenge, real_response),
                (self.simulated_challenge, self.simulated_response),
            )
        };
        BinaryValueProof {
            y1: self.y1,
            y2: self.y2,
            y3: self.y3,
            y4: self.y4,
            beta1,
            beta2,
            omega1,
            omega2,
        }
    }
}

impl<G: AffineRepr> BinaryValueProof<G> {
    /// Prove that the instance encrypts 0. The proof does not reveal the bit.
    #[instrument(level = "debug", skip_all, fields(transcript_len = transcript.len()))]
    pub fn prove_zero<R: RngCore, D: Digest>(
        rng: &mut R,
        params: &BinaryValueParams<G>,
        instance: &BinaryValueInstance<G>,
        witness: &BinaryValueWitness<G::ScalarField>,
        transcript: &mut ByteTranscript,
    ) -> Result<Self, SigmaError> {
        let protocol = BinaryValueProtocol::init_zero(rng, params, instance, witness);
        Self::complete::<D>(protocol, instance, transcript)
    }

    /// Prove that the instance encrypts 1. The proof does not reveal the bit.
    #[instrument(level = "debug", skip_all, fields(transcript_len = transcript.len()))]
    pub fn prove_one<R: RngCore, D: Digest>(
        rng: &mut R,
        params: &BinaryValueParams<G>,
        instance: &BinaryValueInstance<G>,
        witness: &BinaryValueWitness<G::ScalarField>,
        transcript: &mut ByteTranscript,
    ) -> Result<Self, SigmaError> {
        let protocol = BinaryValueProtocol::init_one(rng, params, instance, witness);
        Self::complete::<D>(protocol, instance, transcript)
    }

    fn complete<D: Digest>(
        protocol: BinaryValueProtocol<G>,
        instance: &BinaryValueInstance<G>,
        transcript: &mut ByteTranscript,
    ) -> Result<Self, SigmaError> {
        protocol.challenge_contribution(instance, &mut *transcript)?;
        let challenge = transcript.challenge::<G::ScalarField, D>();
        trace!(stage = "challenge", %challenge);
        Ok(protocol.gen_proof(&challenge))
    }

    /// Recomputes the four commitments from the shares and responses, derives the challenge from
    /// them and accepts if they match the proof's and the shares add up to the challenge.
    #[instrument(level = "debug", skip_all, fields(transcript_len = transcript.len()))]
    pub fn verify<D: Digest>(
        &self,
        params: &BinaryValueParams<G>,
        instance: &BinaryValueInstance<G>,
        transcript: &mut ByteTranscript,
    ) -> bool {
        let a = self.recompute_commitments(params, instance);
        if let Err(error) = Self::compute_challenge_contribution(
            instance,
            &a[0],
            &a[1],
            &a[2],
            &a[3],
            &mut *transcript,
        ) {
            debug!(stage = "verify", ?error, "could not encode transcript");
            return false;
        }
        let challenge = transcript.challenge::<G::ScalarField, D>();
        trace!(stage = "challenge", %challenge);
        self.check(&a, &challenge)
    }

    /// Verify against an externally computed challenge, one that was derived from the proof's
    /// `challenge_contribution`
    pub fn verify_with_challenge(
        &self,
        params: &BinaryValueParams<G>,
        instance: &BinaryValueInstance<G>,
        challenge: &G::ScalarField,
    ) -> bool {
        let a = self.recompute_commitments(params, instance);
        self.check(&a, challenge)
    }

    pub fn challenge_contribution<W: Write>(
        &self,
        instance: &BinaryValueInstance<G>,
        writer: W,
    ) -> Result<(), SigmaError> {
        Self::compute_challenge_contribution(
            instance, &self.y1, &self.y2, &self.y3, &self.y4, writer,
        )
    }

    pub fn compute_challenge_contribution<W: Write>(
        instance: &BinaryValueInstance<G>,
        y1: &G,
        y2: &G,
        y3: &G,
        y4: &G,
        mut writer: W,
    ) -> Result<(), SigmaError> {
        instance.challenge_contribution(&mut writer)?;
        y1.serialize_compressed(&mut writer)?;
        y2.serialize_compressed(&mut writer)?;
        y3.serialize_compressed(&mut writer)?;
        y4.serialize_compressed(&mut writer)?;
        Ok(())
    }

    fn recompute_commitments(
        &self,
        params: &BinaryValueParams<G>,
        instance: &BinaryValueInstance<G>,
    ) -> [G; 4] {
        let (a1, a2) = simulated_commitments(
            params.g,
            instance.u,
            instance.ek,
            instance.v,
            self.beta1,
            self.omega1,
        );
        let (a3, a4) = simulated_commitments(
            params.g,
            instance.shifted_u(params),
            instance.ek,
            instance.v,
            self.beta2,
            self.omega2,
        );
        let a = G::Group::normalize_batch(&[a1, a2, a3, a4]);
        [a[0], a[1], a[2], a[3]]
    }

    fn check(&self, a: &[G; 4], challenge: &G::ScalarField) -> bool {
        let checks = [
            ("y1", a[0] == self.y1),
            ("y2", a[1] == self.y2),
            ("y3", a[2] == self.y3),
            ("y4", a[3] == self.y4),
            ("challenge_sum", (self.beta1 + self.beta2 - challenge).is_zero()),
        ];
        let mut valid = true;
        for (check, ok) in checks {
            if !ok {
                debug!(stage = "verify", check, "binary value relation does not hold");
                valid = false;
            }
        }
        debug!(stage = "verify", valid, "binary value proof");
        valid
    }
}
