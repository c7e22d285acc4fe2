//! Generate prime components for the RSA Private Key

use num_bigint::{BigUint, RandPrime};
use rand_core::CryptoRngCore;

use crate::algorithms::rsa::{compute_modulus, compute_private_exponent_euler_totient};
use crate::errors::{Error, Result};

pub(crate) struct RsaPrivateKeyComponents {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub primes: Vec<BigUint>,
}

/// Upper bound on prime pair draws before giving up. Every realistic run
/// finishes within a handful of attempts.
const MAX_ATTEMPTS: usize = 1000;

/// Generates a two-prime RSA keypair of the given bit size and public
/// exponent from the given random source.
///
/// Each prime has its two top bits set, so the product of a `bit_size / 2`
/// prime and a `bit_size - bit_size / 2` prime has exactly `bit_size` bits.
/// Draws are repeated when the primes collide or `exp` is not invertible
/// modulo the totient.
pub(crate) fn generate_key_with_exp<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bit_size: usize,
    exp: &BigUint,
) -> Result<RsaPrivateKeyComponents> {
    if bit_size < 64 {
        return Err(Error::KeyGeneration(format!(
            "too few primes of {} bits to generate an RSA key",
            bit_size / 2
        )));
    }

    for attempt in 1..=MAX_ATTEMPTS {
        let p = rng.gen_prime(bit_size / 2);
        let q = rng.gen_prime(bit_size - p.bits());

        if p == q {
            continue;
        }

        let primes = vec![p, q];
        let n = compute_modulus(&primes);

        if n.bits() != bit_size {
            continue;
        }

        if let Ok(d) = compute_private_exponent_euler_totient(&primes, exp) {
            tracing::debug!(bit_size, attempt, "found RSA prime pair");
            return Ok(RsaPrivateKeyComponents {
                n,
                e: exp.clone(),
                d,
                primes,
            });
        }
    }

    Err(Error::KeyGeneration(format!(
        "no usable prime pair after {MAX_ATTEMPTS} attempts"
    )))
}
