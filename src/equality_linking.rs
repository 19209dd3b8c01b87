//! Proof that the plaintext of a twisted ElGamal ciphertext is the scalar linking two signature points.
//!
//! Public: parameters `g`, `h`, and the instance `ek`, `R`, `U`, `V`, `A`. The prover knows `v` and `r` such that
//! 1. `U = g * v + h * r`, i.e. `U` is a Pedersen commitment to `v`
//! 2. `V = ek * r`, i.e. `(V, U)` is an encryption of `v` for `ek`
//! 3. `A = R * v`. In an ECDSA-style signature, `R = g1 * k` and `A = g1 * H(msg) + pk * x(R)`, so `v` is the signature's `s`.
//!
//! The three relations share the witness, so one challenge ties them together:
//! 1. Prover picks random `p_s`, `p_beta` and computes `Y1 = g * p_s + h * p_beta`, `Y2 = ek * p_beta`, `Y3 = R * p_s`
//! 2. The challenge is `e = H(ek || R || U || V || Y1 || Y2 || Y3)`
//! 3. Responses are `z1 = p_s - e * v` and `z2 = p_beta - e * r`
//! 4. Verifier checks `Y1 == U * e + g * z1 + h * z2`, `Y2 == V * e + ek * z2` and `Y3 == A * e + R * z1`
//!
//! Which generator of the [`CryptoContext`] plays `g` and which plays `h` is chosen with
//! [`GeneratorAssignment`]. With [`GeneratorAssignment::AuxiliaryFirst`], `(V, U)` is exactly the
//! `(x, y)` of a twisted ElGamal ciphertext of `v` with randomness `r`.

use crate::{
    context::{CryptoContext, GeneratorAssignment},
    error::SigmaError,
    transcript::{ByteTranscript, ChallengeContributor},
    twisted_elgamal::{combine_limb_ciphertexts, TwistedElGamalCiphertext, TwistedElGamalPublicKey},
};
use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{fmt, io::Write, rand::RngCore, UniformRand};
use digest::Digest;
use dock_crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use tracing::{debug, instrument, trace};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Public parameters `(g, h)`
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct EqualityLinkingParams<G: AffineRepr> {
    #[serde_as(as = "ArkObjectBytes")]
    pub g: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub h: G,
}

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct EqualityLinkingInstance<G: AffineRepr> {
    /// Encryption key
    #[serde_as(as = "ArkObjectBytes")]
    pub ek: G,
    /// Signature's `R`
    #[serde_as(as = "ArkObjectBytes")]
    pub r: G,
    /// `g * v + h * r`
    #[serde_as(as = "ArkObjectBytes")]
    pub u: G,
    /// `ek * r`
    #[serde_as(as = "ArkObjectBytes")]
    pub v: G,
    /// Signature's `A`, equal to `R * v`
    #[serde_as(as = "ArkObjectBytes")]
    pub a: G,
}

#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EqualityLinkingWitness<F: PrimeField> {
    /// The encrypted value, eg. signature's `s`
    pub v: F,
    /// Encryption randomness
    pub r: F,
}

/// Prover's state after the first round. Holds the witness and blindings so it is zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EqualityLinkingProtocol<G: AffineRepr> {
    /// `g * p_s + h * p_beta`
    #[zeroize(skip)]
    pub y1: G,
    /// `ek * p_beta`
    #[zeroize(skip)]
    pub y2: G,
    /// `R * p_s`
    #[zeroize(skip)]
    pub y3: G,
    blinding_s: G::ScalarField,
    blinding_beta: G::ScalarField,
    witness_v: G::ScalarField,
    witness_r: G::ScalarField,
}

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct EqualityLinkingProof<G: AffineRepr> {
    #[serde_as(as = "ArkObjectBytes")]
    pub y1: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub y2: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub y3: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub z1: G::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub z2: G::ScalarField,
}

impl<G: AffineRepr> EqualityLinkingParams<G> {
    pub fn new(ctx: &CryptoContext<G>, assignment: GeneratorAssignment) -> Self {
        let (g, h) = ctx.generators(assignment);
        debug!(stage = "setup", ?assignment, %g, %h, "equality linking params");
        Self { g, h }
    }
}

impl<G: AffineRepr> EqualityLinkingInstance<G> {
    pub fn new(ek: G, r: G, u: G, v: G, a: G) -> Self {
        Self { ek, r, u, v, a }
    }

    /// Instance over a twisted ElGamal ciphertext. Expects params created with [`GeneratorAssignment::AuxiliaryFirst`].
    pub fn from_ciphertext(
        public_key: &TwistedElGamalPublicKey<G>,
        ciphertext: &TwistedElGamalCiphertext<G>,
        r: G,
        a: G,
    ) -> Self {
        Self::new(public_key.0, r, ciphertext.y, ciphertext.x, a)
    }

    /// Instance over the ciphertexts of the limbs of `v`. The witness randomness is then
    /// `twisted_elgamal::combine_limb_randomness` of the limbs' randomness.
    pub fn from_limb_ciphertexts(
        public_key: &TwistedElGamalPublicKey<G>,
        ciphertexts: &[TwistedElGamalCiphertext<G>],
        limb_bits: u32,
        r: G,
        a: G,
    ) -> Result<Self, SigmaError> {
        let combined = combine_limb_ciphertexts(ciphertexts, limb_bits)?;
        Ok(Self::from_ciphertext(public_key, &combined, r, a))
    }

    /// Check the relation directly. Meant for callers and tests, the prover does not call it.
    pub fn is_satisfied_by(
        &self,
        params: &EqualityLinkingParams<G>,
        witness: &EqualityLinkingWitness<G::ScalarField>,
    ) -> bool {
        let u = G::Group::msm_unchecked(&[params.g, params.h], &[witness.v, witness.r]);
        u.into_affine() == self.u
            && (self.ek * witness.r).into_affine() == self.v
            && (self.r * witness.v).into_affine() == self.a
    }
}

impl<G: AffineRepr> ChallengeContributor for EqualityLinkingInstance<G> {
    /// Writes `ek || R || U || V`. `A` is fixed by `R` and `v` so it isn't included.
    fn challenge_contribution<W: Write>(&self, mut writer: W) -> Result<(), SigmaError> {
        self.ek.serialize_compressed(&mut writer)?;
        self.r.serialize_compressed(&mut writer)?;
        self.u.serialize_compressed(&mut writer)?;
        self.v.serialize_compressed(&mut writer)?;
        Ok(())
    }
}

impl<F: PrimeField> EqualityLinkingWitness<F> {
    pub fn new(v: F, r: F) -> Self {
        Self { v, r }
    }
}

impl<F: PrimeField> fmt::Debug for EqualityLinkingWitness<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EqualityLinkingWitness(<redacted>)")
    }
}

impl<G: AffineRepr> EqualityLinkingProtocol<G> {
    pub fn init<R: RngCore>(
        rng: &mut R,
        params: &EqualityLinkingParams<G>,
        instance: &EqualityLinkingInstance<G>,
        witness: &EqualityLinkingWitness<G::ScalarField>,
    ) -> Self {
        let blinding_s = G::ScalarField::rand(rng);
        let blinding_beta = G::ScalarField::rand(rng);
        Self::init_with_given_blindings(params, instance, witness, blinding_s, blinding_beta)
    }

    /// Same as `init` but the caller supplies the blindings, eg. when they are shared with another
    /// protocol. Blindings must be uniformly random and never reused.
    pub fn init_with_given_blindings(
        params: &EqualityLinkingParams<G>,
        instance: &EqualityLinkingInstance<G>,
        witness: &EqualityLinkingWitness<G::ScalarField>,
        blinding_s: G::ScalarField,
        blinding_beta: G::ScalarField,
    ) -> Self {
        let y1 = G::Group::msm_unchecked(&[params.g, params.h], &[blinding_s, blinding_beta]);
        let y2 = instance.ek * blinding_beta;
        let y3 = instance.r * blinding_s;
        let y = G::Group::normalize_batch(&[y1, y2, y3]);
        debug!(
            stage = "commit",
            y1 = %y[0],
            y2 = %y[1],
            y3 = %y[2],
            "equality linking commitments"
        );
        Self {
            y1: y[0],
            y2: y[1],
            y3: y[2],
            blinding_s,
            blinding_beta,
            witness_v: witness.v,
            witness_r: witness.r,
        }
    }

    pub fn challenge_contribution<W: Write>(
        &self,
        instance: &EqualityLinkingInstance<G>,
        writer: W,
    ) -> Result<(), SigmaError> {
        Self::compute_challenge_contribution(instance, &self.y1, &self.y2, &self.y3, writer)
    }

    /// `z1 = p_s - e * v` and `z2 = p_beta - e * r`
    pub fn gen_proof(self, challenge: &G::ScalarField) -> EqualityLinkingProof<G> {
        EqualityLinkingProof {
            y1: self.y1,
            y2: self.y2,
            y3: self.y3,
            z1: self.blinding_s - (*challenge * self.witness_v),
            z2: self.blinding_beta - (*challenge * self.witness_r),
        }
    }

    pub fn compute_challenge_contribution<W: Write>(
        instance: &EqualityLinkingInstance<G>,
        y1: &G,
        y2: &G,
        y3: &G,
        mut writer: W,
    ) -> Result<(), SigmaError> {
        instance.challenge_contribution(&mut writer)?;
        y1.serialize_compressed(&mut writer)?;
        y2.serialize_compressed(&mut writer)?;
        y3.serialize_compressed(&mut writer)?;
        Ok(())
    }
}

impl<G: AffineRepr> EqualityLinkingProof<G> {
    /// Run the whole prover. `transcript` should be fresh (or seeded the same way the verifier's
    /// will be) and is left containing the bytes the challenge was computed from.
    #[instrument(level = "debug", skip_all, fields(transcript_len = transcript.len()))]
    pub fn prove<R: RngCore, D: Digest>(
        rng: &mut R,
        params: &EqualityLinkingParams<G>,
        instance: &EqualityLinkingInstance<G>,
        witness: &EqualityLinkingWitness<G::ScalarField>,
        transcript: &mut ByteTranscript,
    ) -> Result<Self, SigmaError> {
        let protocol = EqualityLinkingProtocol::init(rng, params, instance, witness);
        protocol.challenge_contribution(instance, &mut *transcript)?;
        let challenge = transcript.challenge::<G::ScalarField, D>();
        trace!(stage = "challenge", %challenge);
        Ok(protocol.gen_proof(&challenge))
    }

    /// Appends the instance and the proof's commitments to `transcript`, derives the challenge and
    /// checks the proof. A proof that doesn't verify is reported as `false`, never as an error.
    #[instrument(level = "debug", skip_all, fields(transcript_len = transcript.len()))]
    pub fn verify<D: Digest>(
        &self,
        params: &EqualityLinkingParams<G>,
        instance: &EqualityLinkingInstance<G>,
        transcript: &mut ByteTranscript,
    ) -> bool {
        if let Err(error) = self.challenge_contribution(instance, &mut *transcript) {
            debug!(stage = "verify", ?error, "could not encode transcript");
            return false;
        }
        let challenge = transcript.challenge::<G::ScalarField, D>();
        trace!(stage = "challenge", %challenge);
        self.verify_with_challenge(params, instance, &challenge)
    }

    /// Check the 3 relations against an externally computed challenge
    pub fn verify_with_challenge(
        &self,
        params: &EqualityLinkingParams<G>,
        instance: &EqualityLinkingInstance<G>,
        challenge: &G::ScalarField,
    ) -> bool {
        // Y1 == U * e + g * z1 + h * z2
        let c1 = G::Group::msm_unchecked(
            &[instance.u, params.g, params.h],
            &[*challenge, self.z1, self.z2],
        );
        // Y2 == V * e + ek * z2
        let c2 = G::Group::msm_unchecked(&[instance.v, instance.ek], &[*challenge, self.z2]);
        // Y3 == A * e + R * z1
        let c3 = G::Group::msm_unchecked(&[instance.a, instance.r], &[*challenge, self.z1]);
        let c = G::Group::normalize_batch(&[c1, c2, c3]);

        let checks = [
            ("y1", c[0] == self.y1),
            ("y2", c[1] == self.y2),
            ("y3", c[2] == self.y3),
        ];
        let mut valid = true;
        for (check, ok) in checks {
            if !ok {
                debug!(stage = "verify", check, "equality linking relation does not hold");
                valid = false;
            }
        }
        debug!(stage = "verify", valid, "equality linking proof");
        valid
    }

    pub fn challenge_contribution<W: Write>(
        &self,
        instance: &EqualityLinkingInstance<G>,
        writer: W,
    ) -> Result<(), SigmaError> {
        EqualityLinkingProtocol::compute_challenge_contribution(
            instance, &self.y1, &self.y2, &self.y3, writer,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_serialization,
        twisted_elgamal::{combine_limb_randomness, encrypt_limbs, keygen, split_into_limbs},
        ProofEncoding,
    };
    use ark_bls12_381::{Fr, G1Affine};
    use ark_ff::One;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use blake2::Blake2b512;

    fn random_statement(
        rng: &mut StdRng,
        params: &EqualityLinkingParams<G1Affine>,
    ) -> (
        EqualityLinkingInstance<G1Affine>,
        EqualityLinkingWitness<Fr>,
    ) {
        let v = Fr::rand(rng);
        let r = Fr::rand(rng);
        let ek = G1Affine::rand(rng);
        let sig_r = G1Affine::rand(rng);
        let instance = EqualityLinkingInstance::new(
            ek,
            sig_r,
            (params.g * v + params.h * r).into_affine(),
            (ek * r).into_affine(),
            (sig_r * v).into_affine(),
        );
        (instance, EqualityLinkingWitness::new(v, r))
    }

    #[test]
    fn prove_and_verify() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let ctx = CryptoContext::<G1Affine>::new::<Blake2b512>(b"test");
        let params = EqualityLinkingParams::new(&ctx, GeneratorAssignment::AuxiliaryFirst);
        assert_eq!(params.g, ctx.aux_generator);
        assert_eq!(params.h, ctx.generator);

        let (instance, witness) = random_statement(&mut rng, &params);
        assert!(instance.is_satisfied_by(&params, &witness));

        let mut prover_transcript = ByteTranscript::new();
        let proof = EqualityLinkingProof::prove::<_, Blake2b512>(
            &mut rng,
            &params,
            &instance,
            &witness,
            &mut prover_transcript,
        )
        .unwrap();

        let mut verifier_transcript = ByteTranscript::new();
        assert!(proof.verify::<Blake2b512>(&params, &instance, &mut verifier_transcript));
        assert_eq!(prover_transcript, verifier_transcript);

        // Prover's transcript wasn't reset so the challenge is different
        assert!(!proof.verify::<Blake2b512>(&params, &instance, &mut prover_transcript));

        // Both sides seeded the same way
        let mut prover_transcript = ByteTranscript::with_seed(b"session-1");
        let proof = EqualityLinkingProof::prove::<_, Blake2b512>(
            &mut rng,
            &params,
            &instance,
            &witness,
            &mut prover_transcript,
        )
        .unwrap();
        assert!(proof.verify::<Blake2b512>(
            &params,
            &instance,
            &mut ByteTranscript::with_seed(b"session-1")
        ));
        assert!(!proof.verify::<Blake2b512>(
            &params,
            &instance,
            &mut ByteTranscript::with_seed(b"session-2")
        ));

        test_serialization!(EqualityLinkingProof<G1Affine>, proof);
        test_serialization!(EqualityLinkingInstance<G1Affine>, instance);
        test_serialization!(EqualityLinkingParams<G1Affine>, params);
    }

    #[test]
    fn step_by_step_matches_one_shot() {
        let mut rng = StdRng::seed_from_u64(1u64);
        let ctx = CryptoContext::<G1Affine>::new::<Blake2b512>(b"test");
        let params = EqualityLinkingParams::new(&ctx, GeneratorAssignment::AuxiliaryFirst);
        let (instance, witness) = random_statement(&mut rng, &params);

        let protocol = EqualityLinkingProtocol::init(&mut rng, &params, &instance, &witness);
        let mut chal_contrib_prover = vec![];
        protocol
            .challenge_contribution(&instance, &mut chal_contrib_prover)
            .unwrap();
        let challenge_prover =
            crate::transcript::hash_to_scalar::<Fr, Blake2b512>(&chal_contrib_prover);
        let proof = protocol.gen_proof(&challenge_prover);

        let mut chal_contrib_verifier = vec![];
        proof
            .challenge_contribution(&instance, &mut chal_contrib_verifier)
            .unwrap();
        assert_eq!(chal_contrib_prover, chal_contrib_verifier);
        assert!(proof.verify_with_challenge(&params, &instance, &challenge_prover));
        assert!(proof.verify::<Blake2b512>(&params, &instance, &mut ByteTranscript::new()));

        // Prover with fixed blindings is deterministic
        let p1 = EqualityLinkingProtocol::init_with_given_blindings(
            &params,
            &instance,
            &witness,
            Fr::from(3u64),
            Fr::from(4u64),
        );
        let p2 = p1.clone();
        assert_eq!(
            p1.gen_proof(&challenge_prover),
            p2.gen_proof(&challenge_prover)
        );
    }

    #[test]
    fn tampered_proofs_are_rejected() {
        let mut rng = StdRng::seed_from_u64(2u64);
        let ctx = CryptoContext::<G1Affine>::new::<Blake2b512>(b"test");
        let params = EqualityLinkingParams::new(&ctx, GeneratorAssignment::AuxiliaryFirst);
        let (instance, witness) = random_statement(&mut rng, &params);
        let proof = EqualityLinkingProof::prove::<_, Blake2b512>(
            &mut rng,
            &params,
            &instance,
            &witness,
            &mut ByteTranscript::new(),
        )
        .unwrap();
        assert!(proof.verify::<Blake2b512>(&params, &instance, &mut ByteTranscript::new()));

        let verify =
            |p: &EqualityLinkingProof<G1Affine>, i: &EqualityLinkingInstance<G1Affine>| {
                p.verify::<Blake2b512>(&params, i, &mut ByteTranscript::new())
            };

        let mut bad = proof.clone();
        bad.z1 += Fr::one();
        assert!(!verify(&bad, &instance));

        let mut bad = proof.clone();
        bad.z2 = -bad.z2;
        assert!(!verify(&bad, &instance));

        let mut bad = proof.clone();
        bad.y1 = (bad.y1 + params.g).into_affine();
        assert!(!verify(&bad, &instance));

        let mut bad = proof.clone();
        bad.y2 = bad.y3;
        assert!(!verify(&bad, &instance));

        let mut bad = proof.clone();
        bad.y3 = G1Affine::rand(&mut rng);
        assert!(!verify(&bad, &instance));

        // Each instance field is bound
        let mut other = instance.clone();
        other.v = G1Affine::rand(&mut rng);
        assert!(!verify(&proof, &other));

        let mut other = instance.clone();
        other.u = G1Affine::rand(&mut rng);
        assert!(!verify(&proof, &other));

        let mut other = instance.clone();
        other.ek = G1Affine::rand(&mut rng);
        assert!(!verify(&proof, &other));

        let mut other = instance.clone();
        other.r = G1Affine::rand(&mut rng);
        assert!(!verify(&proof, &other));

        let mut other = instance.clone();
        other.a = G1Affine::rand(&mut rng);
        assert!(!verify(&proof, &other));

        // Other generator convention
        let params_other = EqualityLinkingParams::new(&ctx, GeneratorAssignment::PrimaryFirst);
        assert!(!proof.verify::<Blake2b512>(&params_other, &instance, &mut ByteTranscript::new()));
    }

    #[test]
    fn wrong_witness_does_not_verify() {
        let mut rng = StdRng::seed_from_u64(3u64);
        let ctx = CryptoContext::<G1Affine>::new::<Blake2b512>(b"test");
        let params = EqualityLinkingParams::new(&ctx, GeneratorAssignment::AuxiliaryFirst);
        let (mut instance, witness) = random_statement(&mut rng, &params);

        // `A` links to a different value than the one encrypted
        instance.a = (instance.r * (witness.v + Fr::one())).into_affine();
        assert!(!instance.is_satisfied_by(&params, &witness));
        let proof = EqualityLinkingProof::prove::<_, Blake2b512>(
            &mut rng,
            &params,
            &instance,
            &witness,
            &mut ByteTranscript::new(),
        )
        .unwrap();
        assert!(!proof.verify::<Blake2b512>(&params, &instance, &mut ByteTranscript::new()));

        let (instance, witness) = random_statement(&mut rng, &params);
        let bad_witness = EqualityLinkingWitness::new(witness.v, witness.r + Fr::one());
        let proof = EqualityLinkingProof::prove::<_, Blake2b512>(
            &mut rng,
            &params,
            &instance,
            &bad_witness,
            &mut ByteTranscript::new(),
        )
        .unwrap();
        assert!(!proof.verify::<Blake2b512>(&params, &instance, &mut ByteTranscript::new()));
    }

    #[test]
    fn small_scalars() {
        // g, h = g * 3, ek = g * 5, v = 7, r = 11
        let mut rng = StdRng::seed_from_u64(4u64);
        let g = G1Affine::generator();
        let h = (g * Fr::from(3u64)).into_affine();
        let ctx = CryptoContext::from_generators(g, h);
        let params = EqualityLinkingParams::new(&ctx, GeneratorAssignment::PrimaryFirst);
        assert_eq!((params.g, params.h), (g, h));

        let ek = (g * Fr::from(5u64)).into_affine();
        let v = Fr::from(7u64);
        let r = Fr::from(11u64);
        // `U = g * 7 + h * 11 = g * 40` and `V = ek * 11 = g * 55`
        let u = (g * v + h * r).into_affine();
        assert_eq!(u, (g * Fr::from(40u64)).into_affine());
        let big_v = (ek * r).into_affine();
        assert_eq!(big_v, (g * Fr::from(55u64)).into_affine());
        // Signature side is trivially satisfied with `R = g` and `A = g * 7`
        let instance = EqualityLinkingInstance::new(ek, g, u, big_v, (g * v).into_affine());
        let witness = EqualityLinkingWitness::new(v, r);
        assert!(instance.is_satisfied_by(&params, &witness));

        let mut proof = EqualityLinkingProof::prove::<_, Blake2b512>(
            &mut rng,
            &params,
            &instance,
            &witness,
            &mut ByteTranscript::new(),
        )
        .unwrap();
        assert!(proof.verify::<Blake2b512>(&params, &instance, &mut ByteTranscript::new()));

        proof.z1 += Fr::one();
        assert!(!proof.verify::<Blake2b512>(&params, &instance, &mut ByteTranscript::new()));
    }

    #[test]
    fn over_limb_ciphertexts() {
        let mut rng = StdRng::seed_from_u64(5u64);
        let ctx = CryptoContext::<G1Affine>::new::<Blake2b512>(b"test");
        let params = EqualityLinkingParams::new(&ctx, GeneratorAssignment::AuxiliaryFirst);
        let (_, pk) = keygen(&mut rng, &ctx);
        let limb_bits = 32;

        let s = Fr::rand(&mut rng);
        let sig_r = G1Affine::rand(&mut rng);
        let a = (sig_r * s).into_affine();

        let limbs = split_into_limbs(&s, limb_bits).unwrap();
        let (cts, randomness) = encrypt_limbs(&mut rng, &ctx, &pk, &limbs);
        let instance =
            EqualityLinkingInstance::from_limb_ciphertexts(&pk, &cts, limb_bits, sig_r, a)
                .unwrap();
        let witness = EqualityLinkingWitness::new(
            s,
            combine_limb_randomness(&randomness, limb_bits).unwrap(),
        );
        assert!(instance.is_satisfied_by(&params, &witness));

        let proof = EqualityLinkingProof::prove::<_, Blake2b512>(
            &mut rng,
            &params,
            &instance,
            &witness,
            &mut ByteTranscript::new(),
        )
        .unwrap();
        assert!(proof.verify::<Blake2b512>(&params, &instance, &mut ByteTranscript::new()));

        // Dropping a limb changes the ciphertext
        let instance_missing = EqualityLinkingInstance::from_limb_ciphertexts(
            &pk,
            &cts[1..],
            limb_bits,
            sig_r,
            a,
        )
        .unwrap();
        assert!(!proof.verify::<Blake2b512>(
            &params,
            &instance_missing,
            &mut ByteTranscript::new()
        ));
    }

    #[test]
    fn encoding() {
        let mut rng = StdRng::seed_from_u64(6u64);
        let ctx = CryptoContext::<G1Affine>::new::<Blake2b512>(b"test");
        let params = EqualityLinkingParams::new(&ctx, GeneratorAssignment::AuxiliaryFirst);
        let (instance, witness) = random_statement(&mut rng, &params);
        let proof = EqualityLinkingProof::prove::<_, Blake2b512>(
            &mut rng,
            &params,
            &instance,
            &witness,
            &mut ByteTranscript::new(),
        )
        .unwrap();

        let bytes = proof.to_bytes().unwrap();
        let point_size = G1Affine::default().compressed_size();
        let scalar_size = Fr::default().compressed_size();
        assert_eq!(bytes.len(), 3 * point_size + 2 * scalar_size);
        assert_eq!(proof.encoded_size(), bytes.len());

        // Y1, Y2, Y3 then z1, z2
        let mut expected = vec![];
        for p in [proof.y1, proof.y2, proof.y3] {
            p.serialize_compressed(&mut expected).unwrap();
        }
        for s in [proof.z1, proof.z2] {
            s.serialize_compressed(&mut expected).unwrap();
        }
        assert_eq!(bytes, expected);

        let decoded = EqualityLinkingProof::<G1Affine>::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.y1, proof.y1);
        assert_eq!(decoded.y2, proof.y2);
        assert_eq!(decoded.y3, proof.y3);
        assert_eq!(decoded.z1, proof.z1);
        assert_eq!(decoded.z2, proof.z2);
        assert!(decoded.verify::<Blake2b512>(&params, &instance, &mut ByteTranscript::new()));

        // Scalar not less than the group order
        let mut bad = bytes.clone();
        for b in bad[3 * point_size..3 * point_size + scalar_size].iter_mut() {
            *b = 0xff;
        }
        assert!(matches!(
            EqualityLinkingProof::<G1Affine>::from_bytes(&bad),
            Err(SigmaError::Serialization(_))
        ));

        // Truncated and with trailing bytes
        assert!(EqualityLinkingProof::<G1Affine>::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        let mut longer = bytes.clone();
        longer.push(0);
        assert!(EqualityLinkingProof::<G1Affine>::from_bytes(&longer).is_err());

        // Not a point on the curve
        let mut bad = bytes.clone();
        let mut flipped = None;
        for i in 1..point_size {
            bad[i] ^= 0x01;
            if EqualityLinkingProof::<G1Affine>::from_bytes(&bad).is_err() {
                flipped = Some(i);
                break;
            }
            bad[i] ^= 0x01;
        }
        assert!(flipped.is_some());

        // On the curve but not in the prime order subgroup
        let mut bad = bytes.clone();
        let mut y1 = vec![];
        crate::tests::point_outside_subgroup()
            .serialize_compressed(&mut y1)
            .unwrap();
        bad[..point_size].copy_from_slice(&y1);
        assert!(matches!(
            EqualityLinkingProof::<G1Affine>::from_bytes(&bad),
            Err(SigmaError::Serialization(_))
        ));
    }

    #[test]
    fn witness_is_not_printed() {
        let witness = EqualityLinkingWitness::new(Fr::from(7u64), Fr::from(11u64));
        let printed = format!("{:?}", witness);
        assert_eq!(printed, "EqualityLinkingWitness(<redacted>)");
        assert!(!printed.contains('7'));
    }
}
