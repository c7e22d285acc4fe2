//! PKCS#1 v1.5 encryption as described in [RFC8017 § 7.2].
//!
//! [RFC8017 § 7.2]: https://datatracker.ietf.org/doc/html/rfc8017#section-7.2

use num_bigint::BigUint;
use rand_core::{CryptoRngCore, OsRng};
use zeroize::Zeroizing;

use crate::algorithms::pad::{uint_to_be_pad, uint_to_zeroizing_be_pad};
use crate::algorithms::pkcs1v15::{pkcs1v15_encrypt_pad, pkcs1v15_encrypt_unpad};
use crate::algorithms::rsa::{rsa_decrypt_and_check, rsa_encrypt};
use crate::errors::{Error, Result};
use crate::key::{self, RsaPrivateKey, RsaPublicKey};
use crate::traits::PublicKeyParts;

/// Encrypts `msg` under `pub_key`, drawing the padding string from the
/// operating system's random source.
pub fn encrypt(pub_key: &RsaPublicKey, msg: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_rng(&mut OsRng, pub_key, msg)
}

/// Encrypts the given message with RSA and the padding
/// scheme from PKCS#1 v1.5.  The message must be no longer than the
/// length of the public modulus minus 11 bytes.
///
/// The ciphertext is exactly as long as the modulus.
pub fn encrypt_with_rng<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    pub_key: &RsaPublicKey,
    msg: &[u8],
) -> Result<Vec<u8>> {
    key::check_public(pub_key)?;

    let k = pub_key.size();
    let em = pkcs1v15_encrypt_pad(rng, msg, k)?;
    let int = Zeroizing::new(BigUint::from_bytes_be(&em));
    uint_to_be_pad(rsa_encrypt(pub_key, &int), k)
        .ok_or_else(|| Error::InvalidKeyFormat("ciphertext exceeds modulus size".into()))
}

/// Decrypts `ciphertext` with `priv_key`, blinding the private operation
/// with randomness from the operating system.
pub fn decrypt(priv_key: &RsaPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    decrypt_with_rng(&mut OsRng, priv_key, ciphertext)
}

/// Decrypts a plaintext using RSA and the padding scheme from PKCS#1 v1.5.
///
/// RSA blinding with `rng` is applied to avoid timing side-channel attacks.
/// A ciphertext of the wrong length, one not below the modulus and any
/// padding failure all yield the same [`Error::Decryption`].
pub fn decrypt_with_rng<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    priv_key: &RsaPrivateKey,
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let k = priv_key.size();
    if ciphertext.len() != k {
        return Err(Error::Decryption);
    }

    let c = BigUint::from_bytes_be(ciphertext);
    let em = rsa_decrypt_and_check(priv_key, Some(rng), &c)?;
    let em = uint_to_zeroizing_be_pad(em, k).ok_or(Error::Decryption)?;

    pkcs1v15_encrypt_unpad(&em, k)
}
