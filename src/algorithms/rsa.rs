//! Generic RSA implementation

use std::borrow::Cow;

use num_bigint::{BigUint, ModInverse, RandBigInt};
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use crate::errors::{Error, Result};
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// Raw RSA encryption of m with the public key. No padding is performed.
#[inline]
pub(crate) fn rsa_encrypt<K: PublicKeyParts>(key: &K, m: &BigUint) -> BigUint {
    m.modpow(key.e(), key.n())
}

/// Performs raw RSA decryption with no padding or error checking.
///
/// Returns a plaintext `BigUint`. Performs RSA blinding if an `Rng` is passed.
/// Uses the CRT parameters when the key carries them.
#[inline]
pub(crate) fn rsa_decrypt<R: CryptoRngCore + ?Sized>(
    mut rng: Option<&mut R>,
    priv_key: &impl PrivateKeyParts,
    c: &BigUint,
) -> Result<BigUint> {
    if c >= priv_key.n() {
        return Err(Error::Decryption);
    }

    if priv_key.n().is_zero() {
        return Err(Error::Decryption);
    }

    let mut ir = None;

    let c = if let Some(ref mut rng) = rng {
        let (blinded, unblinder) = blind(rng, priv_key, c);
        ir = Some(unblinder);
        Cow::Owned(blinded)
    } else {
        Cow::Borrowed(c)
    };

    let m = match (priv_key.dp(), priv_key.dq(), priv_key.qinv()) {
        (Some(dp), Some(dq), Some(qinv)) => {
            // We have the precalculated values needed for the CRT.
            let p = &priv_key.primes()[0];
            let q = &priv_key.primes()[1];

            let mut m1 = c.modpow(dp, p);
            let mut m2 = c.modpow(dq, q);

            // h = qinv * (m1 - m2) mod p
            let mut m2_mod_p = &m2 % p;
            let mut diff = if m1 >= m2_mod_p {
                &m1 - &m2_mod_p
            } else {
                &m1 + p - &m2_mod_p
            };
            let mut h = (qinv * &diff) % p;
            let m = &m2 + &h * q;

            // clear tmp values
            m1.zeroize();
            m2.zeroize();
            m2_mod_p.zeroize();
            diff.zeroize();
            h.zeroize();

            m
        }
        _ => c.modpow(priv_key.d(), priv_key.n()),
    };

    match ir {
        Some(ref ir) => Ok(unblind(priv_key, &m, ir)),
        None => Ok(m),
    }
}

/// Performs raw RSA decryption with no padding.
///
/// Returns a plaintext `BigUint`. Performs RSA blinding if an `Rng` is passed.
/// This will also check for errors in the CRT computation.
#[inline]
pub(crate) fn rsa_decrypt_and_check<R: CryptoRngCore + ?Sized>(
    priv_key: &impl PrivateKeyParts,
    rng: Option<&mut R>,
    c: &BigUint,
) -> Result<BigUint> {
    let m = rsa_decrypt(rng, priv_key, c)?;

    // In order to defend against errors in the CRT computation, m^e is
    // calculated, which should match the original ciphertext.
    let check = rsa_encrypt(priv_key, &m);

    if c != &check {
        return Err(Error::Decryption);
    }

    Ok(m)
}

/// Returns the blinded c, along with the unblinding factor.
fn blind<R: CryptoRngCore + ?Sized, K: PublicKeyParts>(
    rng: &mut R,
    key: &K,
    c: &BigUint,
) -> (BigUint, BigUint) {
    // Blinding involves multiplying c by r^e.
    // Then the decryption operation performs (m^e * r^e)^d mod n
    // which equals mr mod n. The factor of r can then be removed
    // by multiplying by the multiplicative inverse of r.
    let mut r: BigUint;
    let unblinder;
    loop {
        r = rng.gen_biguint_below(key.n());
        if r.is_zero() {
            r = BigUint::one();
        }
        if let Some(ub) = r.clone().mod_inverse(key.n()).and_then(|ir| ir.to_biguint()) {
            unblinder = ub;
            break;
        }
    }

    let c = {
        let mut rpowe = r.modpow(key.e(), key.n()); // N != 0
        let mut c = c * &rpowe;
        c %= key.n();

        rpowe.zeroize();
        r.zeroize();

        c
    };

    (c, unblinder)
}

/// Given an m and and unblinding factor, unblind the m.
fn unblind(key: &impl PublicKeyParts, m: &BigUint, unblinder: &BigUint) -> BigUint {
    (m * unblinder) % key.n()
}

/// Compute the modulus of a key from its primes.
pub(crate) fn compute_modulus(primes: &[BigUint]) -> BigUint {
    primes
        .iter()
        .fold(BigUint::one(), |acc, prime| acc * prime)
}

/// Compute the private exponent from its primes (p and q) and public exponent
/// This uses Euler's totient function
#[inline]
pub(crate) fn compute_private_exponent_euler_totient(
    primes: &[BigUint],
    exp: &BigUint,
) -> Result<BigUint> {
    if primes.len() < 2 {
        return Err(Error::KeyGeneration("nprimes must be >= 2".into()));
    }

    let mut totient = BigUint::one();

    for prime in primes {
        totient *= prime - BigUint::one();
    }

    exp.mod_inverse(totient)
        .and_then(|d| d.to_biguint())
        .ok_or_else(|| Error::KeyGeneration("public exponent is not invertible".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::RsaPrivateKey;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    // p = 61, q = 53, e = 17, d = 2753
    fn textbook_key() -> RsaPrivateKey {
        RsaPrivateKey::from_components_unchecked(
            BigUint::from(3233u32),
            BigUint::from(17u32),
            BigUint::from(2753u32),
            vec![BigUint::from(61u32), BigUint::from(53u32)],
        )
    }

    #[test]
    fn textbook_roundtrip_with_and_without_crt() {
        let key = textbook_key();
        let m = BigUint::from(65u32);
        let c = rsa_encrypt(&key, &m);
        assert_eq!(c, BigUint::from(2790u32));

        let plain = rsa_decrypt_and_check(&key, None::<&mut ChaCha8Rng>, &c).unwrap();
        assert_eq!(plain, m);

        let mut rng = ChaCha8Rng::from_seed([7; 32]);
        let blinded = rsa_decrypt_and_check(&key, Some(&mut rng), &c).unwrap();
        assert_eq!(blinded, m);
    }

    #[test]
    fn ciphertext_out_of_range() {
        let key = textbook_key();
        let c = BigUint::from(3233u32);
        assert_eq!(
            rsa_decrypt(None::<&mut ChaCha8Rng>, &key, &c),
            Err(Error::Decryption)
        );
    }

    #[test]
    fn private_exponent_from_primes() {
        let primes = [BigUint::from(61u32), BigUint::from(53u32)];
        let d = compute_private_exponent_euler_totient(&primes, &BigUint::from(17u32)).unwrap();
        assert_eq!(d, BigUint::from(2753u32));
        assert_eq!(compute_modulus(&primes), BigUint::from(3233u32));
    }
}
