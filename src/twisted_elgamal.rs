//! Twisted ElGamal encryption, enough of it to build and check the instances of the proofs in this crate.
//!
//! With context generators `g` (primary) and `h` (auxiliary) and a public key `pk = g * sk`,
//! a message `m` encrypted with randomness `r` is the pair
//! - `x = pk * r`
//! - `y = g * r + h * m`
//!
//! `y` is a Pedersen commitment to `m`, which is what lets Sigma protocols reason about the plaintext.
//! Decryption gives `y - x * sk^-1 = h * m` and only recovers `m` when it is small, so large values
//! such as a signature scalar are split into limbs of a few bits, each limb is encrypted
//! separately and the limb ciphertexts are recombined homomorphically into one ciphertext of the
//! whole value.

use crate::{context::CryptoContext, error::SigmaError};
use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{BigInteger, Field, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{cfg_iter, fmt, rand::RngCore, vec::Vec, UniformRand};
use dock_crypto_utils::{serde_utils::ArkObjectBytes, solve_discrete_log::solve_discrete_log_bsgs};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct TwistedElGamalSecretKey<F: PrimeField>(pub F);

#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct TwistedElGamalPublicKey<G: AffineRepr>(#[serde_as(as = "ArkObjectBytes")] pub G);

#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct TwistedElGamalCiphertext<G: AffineRepr> {
    /// `pk * r`
    #[serde_as(as = "ArkObjectBytes")]
    pub x: G,
    /// `g * r + h * m`
    #[serde_as(as = "ArkObjectBytes")]
    pub y: G,
}

impl<F: PrimeField> fmt::Debug for TwistedElGamalSecretKey<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TwistedElGamalSecretKey(<redacted>)")
    }
}

impl<F: PrimeField> TwistedElGamalSecretKey<F> {
    pub fn new<R: RngCore>(rng: &mut R) -> Self {
        loop {
            let sk = F::rand(rng);
            if !sk.is_zero() {
                return Self(sk);
            }
        }
    }
}

impl<G: AffineRepr> TwistedElGamalPublicKey<G> {
    pub fn new(
        secret_key: &TwistedElGamalSecretKey<G::ScalarField>,
        ctx: &CryptoContext<G>,
    ) -> Self {
        Self((ctx.generator * secret_key.0).into_affine())
    }
}

pub fn keygen<R: RngCore, G: AffineRepr>(
    rng: &mut R,
    ctx: &CryptoContext<G>,
) -> (TwistedElGamalSecretKey<G::ScalarField>, TwistedElGamalPublicKey<G>) {
    let sk = TwistedElGamalSecretKey::new(rng);
    let pk = TwistedElGamalPublicKey::new(&sk, ctx);
    (sk, pk)
}

impl<G: AffineRepr> TwistedElGamalCiphertext<G> {
    /// Encrypt `message` using the given `randomness`
    pub fn new(
        ctx: &CryptoContext<G>,
        public_key: &TwistedElGamalPublicKey<G>,
        message: &G::ScalarField,
        randomness: &G::ScalarField,
    ) -> Self {
        let x = public_key.0 * randomness;
        let y = G::Group::msm_unchecked(
            &[ctx.generator, ctx.aux_generator],
            &[*randomness, *message],
        );
        let affine = G::Group::normalize_batch(&[x, y]);
        Self {
            x: affine[0],
            y: affine[1],
        }
    }

    /// Returns the ciphertext and the randomness used to create it
    pub fn new_with_rng<R: RngCore>(
        rng: &mut R,
        ctx: &CryptoContext<G>,
        public_key: &TwistedElGamalPublicKey<G>,
        message: &G::ScalarField,
    ) -> (Self, G::ScalarField) {
        let randomness = G::ScalarField::rand(rng);
        (Self::new(ctx, public_key, message, &randomness), randomness)
    }

    /// Returns `h * m`
    pub fn decrypt_to_point(
        &self,
        secret_key: &TwistedElGamalSecretKey<G::ScalarField>,
    ) -> Result<G, SigmaError> {
        let sk_inv = secret_key.0.inverse().ok_or(SigmaError::ZeroSecretKey)?;
        Ok((self.y.into_group() - self.x * sk_inv).into_affine())
    }

    /// Recover the message if it is at most `max`. `max` can't exceed [`MAX_DECRYPTION_BOUND`].
    pub fn decrypt(
        &self,
        ctx: &CryptoContext<G>,
        secret_key: &TwistedElGamalSecretKey<G::ScalarField>,
        max: u64,
    ) -> Result<u64, SigmaError> {
        let target = self.decrypt_to_point(secret_key)?;
        discrete_log_up_to(max, ctx.aux_generator.into_group(), target.into_group())?
            .ok_or(SigmaError::PlaintextOutOfRange(max))
    }
}

fn check_limb_size(limb_bits: u32) -> Result<(), SigmaError> {
    if limb_bits == 0 || limb_bits > 64 {
        return Err(SigmaError::InvalidLimbSize(limb_bits));
    }
    Ok(())
}

/// Number of limbs of `limb_bits` bits needed to hold any scalar of `F`
pub fn num_limbs<F: PrimeField>(limb_bits: u32) -> Result<usize, SigmaError> {
    check_limb_size(limb_bits)?;
    Ok(((F::MODULUS_BIT_SIZE + limb_bits - 1) / limb_bits) as usize)
}

/// Split `value` into big-endian limbs of `limb_bits` bits, i.e. the first limb is the most significant
pub fn split_into_limbs<F: PrimeField>(
    value: &F,
    limb_bits: u32,
) -> Result<Vec<u64>, SigmaError> {
    let n = num_limbs::<F>(limb_bits)?;
    let bits = value.into_bigint().to_bits_le();
    let limb_bits = limb_bits as usize;
    Ok((0..n)
        .rev()
        .map(|pos| {
            (0..limb_bits).fold(0u64, |limb, k| match bits.get(pos * limb_bits + k) {
                Some(true) => limb | (1u64 << k),
                _ => limb,
            })
        })
        .collect())
}

fn limb_shift<F: PrimeField>(limb_bits: u32) -> F {
    F::from(2u64).pow([limb_bits as u64])
}

/// Inverse of `split_into_limbs`, `sum(limbs[i] * 2^(limb_bits * (n - 1 - i)))`
pub fn recombine_limbs<F: PrimeField>(limbs: &[u64], limb_bits: u32) -> Result<F, SigmaError> {
    check_limb_size(limb_bits)?;
    let shift = limb_shift::<F>(limb_bits);
    Ok(limbs
        .iter()
        .fold(F::zero(), |acc, l| acc * shift + F::from(*l)))
}

/// Combine the randomness of limb encryptions the same way the limbs are combined. This is the
/// randomness of the ciphertext returned by `combine_limb_ciphertexts`.
pub fn combine_limb_randomness<F: PrimeField>(
    randomness: &[F],
    limb_bits: u32,
) -> Result<F, SigmaError> {
    check_limb_size(limb_bits)?;
    let shift = limb_shift::<F>(limb_bits);
    Ok(randomness.iter().fold(F::zero(), |acc, r| acc * shift + r))
}

/// Homomorphically combine limb ciphertexts into a ciphertext of the whole value,
/// `sum(ciphertexts[i] * 2^(limb_bits * (n - 1 - i)))`, component-wise
pub fn combine_limb_ciphertexts<G: AffineRepr>(
    ciphertexts: &[TwistedElGamalCiphertext<G>],
    limb_bits: u32,
) -> Result<TwistedElGamalCiphertext<G>, SigmaError> {
    check_limb_size(limb_bits)?;
    let shift = limb_shift::<G::ScalarField>(limb_bits);
    let (x, y) = ciphertexts
        .iter()
        .fold((G::Group::zero(), G::Group::zero()), |(x, y), c| {
            (x * shift + c.x, y * shift + c.y)
        });
    let affine = G::Group::normalize_batch(&[x, y]);
    Ok(TwistedElGamalCiphertext {
        x: affine[0],
        y: affine[1],
    })
}

/// Encrypt each limb with fresh randomness. Returns the ciphertexts and their randomness in limb order.
pub fn encrypt_limbs<R: RngCore, G: AffineRepr>(
    rng: &mut R,
    ctx: &CryptoContext<G>,
    public_key: &TwistedElGamalPublicKey<G>,
    limbs: &[u64],
) -> (Vec<TwistedElGamalCiphertext<G>>, Vec<G::ScalarField>) {
    let randomness = (0..limbs.len())
        .map(|_| G::ScalarField::rand(rng))
        .collect::<Vec<_>>();
    let ciphertexts = cfg_iter!(limbs)
        .zip(cfg_iter!(randomness))
        .map(|(l, r)| {
            TwistedElGamalCiphertext::new(ctx, public_key, &G::ScalarField::from(*l), r)
        })
        .collect::<Vec<_>>();
    (ciphertexts, randomness)
}

/// Decrypt limb ciphertexts, each limb must be less than `2^limb_bits`. Limbs wider than
/// [`MAX_DECRYPTABLE_LIMB_BITS`] can be encrypted and combined but not decrypted.
pub fn decrypt_limbs<G: AffineRepr>(
    ctx: &CryptoContext<G>,
    secret_key: &TwistedElGamalSecretKey<G::ScalarField>,
    ciphertexts: &[TwistedElGamalCiphertext<G>],
    limb_bits: u32,
) -> Result<Vec<u64>, SigmaError> {
    check_limb_size(limb_bits)?;
    let max = if limb_bits == 64 {
        u64::MAX
    } else {
        (1u64 << limb_bits) - 1
    };
    if limb_bits > MAX_DECRYPTABLE_LIMB_BITS {
        return Err(SigmaError::DecryptionBoundTooLarge(max));
    }
    let base = ctx.aux_generator.into_group();
    ciphertexts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let target = c.decrypt_to_point(secret_key)?;
            discrete_log_up_to(max, base, target.into_group())?
                .ok_or(SigmaError::LimbOutOfRange(i))
        })
        .collect()
}

/// Baby step giant step needs about `sqrt(max)` points in memory
pub const MAX_DECRYPTABLE_LIMB_BITS: u32 = 40;
pub const MAX_DECRYPTION_BOUND: u64 = (1 << MAX_DECRYPTABLE_LIMB_BITS) - 1;

/// `x` in `[0, max]` with `base * x = target` if one exists
fn discrete_log_up_to<G: CurveGroup>(
    max: u64,
    base: G,
    target: G,
) -> Result<Option<u64>, SigmaError> {
    if max > MAX_DECRYPTION_BOUND {
        return Err(SigmaError::DecryptionBoundTooLarge(max));
    }
    Ok(solve_discrete_log_bsgs(max, base, target).filter(|x| *x <= max))
}
