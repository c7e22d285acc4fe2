//! `RSASSA-PKCS1-v1_5` signatures as described in [RFC8017 § 8.2].
//!
//! The message is hashed with the digest selected by [`SignatureAlgorithm`]
//! before padding.
//!
//! [RFC8017 § 8.2]: https://datatracker.ietf.org/doc/html/rfc8017#section-8.2

use num_bigint::BigUint;
use rand_core::{CryptoRngCore, OsRng};

use crate::algorithm::SignatureAlgorithm;
use crate::algorithms::pad::{uint_to_be_pad, uint_to_zeroizing_be_pad};
use crate::algorithms::pkcs1v15::{pkcs1v15_sign_pad, pkcs1v15_sign_unpad};
use crate::algorithms::rsa::{rsa_decrypt_and_check, rsa_encrypt};
use crate::errors::{Error, Result};
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::traits::PublicKeyParts;

/// Signs `msg` with `priv_key`, blinding the private operation with
/// randomness from the operating system.
///
/// The signature is as long as the modulus. PKCS#1 v1.5 signatures are
/// deterministic: the same key, algorithm and message always give the same
/// bytes.
pub fn sign(
    priv_key: &RsaPrivateKey,
    algorithm: SignatureAlgorithm,
    msg: &[u8],
) -> Result<Vec<u8>> {
    sign_with_rng(&mut OsRng, priv_key, algorithm, msg)
}

/// Signs `msg` with `priv_key`, blinding the private operation with `rng`.
///
/// Fails with [`Error::Signing`] when the modulus is too short to hold the
/// algorithm's `DigestInfo`.
pub fn sign_with_rng<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    priv_key: &RsaPrivateKey,
    algorithm: SignatureAlgorithm,
    msg: &[u8],
) -> Result<Vec<u8>> {
    let k = priv_key.size();
    let hashed = algorithm.digest(msg);
    let prefix = algorithm.digest_info_prefix();
    let em = pkcs1v15_sign_pad(&prefix, &hashed, k)?;

    let m = BigUint::from_bytes_be(&em);
    let s = rsa_decrypt_and_check(priv_key, Some(rng), &m)
        .map_err(|_| Error::Signing("private key operation failed".into()))?;

    let sig = uint_to_zeroizing_be_pad(s, k)
        .ok_or_else(|| Error::Signing("signature exceeds modulus size".into()))?;
    Ok(sig.to_vec())
}

/// Verifies an RSA PKCS#1 v1.5 signature over `msg`.
///
/// Any mismatch, including a signature of the wrong length or one not below
/// the modulus, yields `false`.
pub fn verify(
    pub_key: &RsaPublicKey,
    algorithm: SignatureAlgorithm,
    msg: &[u8],
    sig: &[u8],
) -> bool {
    let k = pub_key.size();
    if sig.len() != k {
        return false;
    }

    let s = BigUint::from_bytes_be(sig);
    if &s >= pub_key.n() {
        return false;
    }

    let em = match uint_to_be_pad(rsa_encrypt(pub_key, &s), k) {
        Some(em) => em,
        None => return false,
    };

    let hashed = algorithm.digest(msg);
    pkcs1v15_sign_unpad(&algorithm.digest_info_prefix(), &hashed, &em, k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    fn get_private_key() -> RsaPrivateKey {
        // https://github.com/C2SP/wycheproof/blob/main/testvectors/rsa_oaep_misc_test.json
        RsaPrivateKey::from_components(
            BigUint::parse_bytes(b"d0941e63a980fa92fb25ed4c7b3307f827023034ae7f1a7491f0699ca7607285e62ad8e994bac21b8b6e305e334f4874067d28e304230dca7f0e85f7ce595770b6e054c9f844ba86c0696eeba0769d8d4a347e8fe85c724ac1c44994af18a39e719f721f1bc50c46a39e6c075fcd1649f01f22608ce7dc6955502258336987d9", 16).unwrap(),
            BigUint::from(65_537u64),
            BigUint::parse_bytes(b"5ff4a47e690ea338573e3d8b3fea5c32378ff4296855a51017cba86a9f3de9b1dc0fbe36c76b9bbd1c4a170a5f448c2a8489b3f3ac858be4aacb3daaa14dccc183622eedd3ae6f0427a2a298b51b97818a5430f13705f42d8b25476f939c935e389e30d9ade5d0180920135f5aef0c5fecd15f00b83b51dab8ba930d88826801", 16).unwrap(),
            vec![
                BigUint::parse_bytes(b"e882d12d5f0be26a80359f13c08210bdcbf759dfee695313efa8886919659b064e3c656a267af6275ed1af89a5dfe9e25b31a02bafbd59445b7507a22989a681", 16).unwrap(),
                BigUint::parse_bytes(b"e5a65cfa668bd857d59135a78c18c8adb7c222368e9d74abad8e83299f7ac3c2ad7aa44ddb05deea6d9b20dbaf09a8615284a17c72d3723240334685ea7e2559", 16).unwrap(),
            ],
        ).unwrap()
    }

    #[test]
    fn test_sign_pkcs1v15() {
        let priv_key = get_private_key();

        let tests = [
            (
                SignatureAlgorithm::Sha1WithRsa,
                hex!("2c5954065af5f8c651cc46c49af719507648947a6100ef5c37294939a396c529551bd65c90c4aae0417cd3e621bcfb1d40630b6593a14589b94943efa50342310c23b07aa7acd102dc0b922272db0908509467d56ae3edc5d4ec71ba072f509d0f83d7bc1d88174c0c39a3587963c8625e606c3b99cf9a202da0c0b3677a082d"),
            ),
            (
                SignatureAlgorithm::Sha256WithRsa,
                hex!("506ea024cfef1a98540d98da07d50a3c08bf03e09f9503e211dada539cd99bcb31e1d439d19182e4ec195496602180874ee1300282f62c74f7d57b9b619ac6092eebb47fedeca1d5d0e63bb5e1f630b06e170a1409fd310e265409b29bb741c37f5400524a6cf18e396ebda1190bc585086e214586d97f0ff822907796bc3879"),
            ),
        ];

        for (algorithm, expected) in &tests {
            let out = sign(&priv_key, *algorithm, b"Test.\n").unwrap();
            assert_eq!(out, expected);

            let mut rng = ChaCha8Rng::from_seed([42; 32]);
            let out2 = sign_with_rng(&mut rng, &priv_key, *algorithm, b"Test.\n").unwrap();
            assert_eq!(out2, expected);
        }
    }

    #[test]
    fn test_verify_pkcs1v15() {
        let priv_key = get_private_key();

        let tests = [
            (
                "Test.\n",
                hex!("2c5954065af5f8c651cc46c49af719507648947a6100ef5c37294939a396c529551bd65c90c4aae0417cd3e621bcfb1d40630b6593a14589b94943efa50342310c23b07aa7acd102dc0b922272db0908509467d56ae3edc5d4ec71ba072f509d0f83d7bc1d88174c0c39a3587963c8625e606c3b99cf9a202da0c0b3677a082d"),
                true,
            ),
            (
                "Test.\n",
                hex!("7919de0402424f7b00f16bda36bb7b4d83dd7fb2cb315d9083f60457063393948dc991cfc8161c7b1266ec373b69bc47554a833f95edab8266385a3a36786fe90f172a9882eddc451f3f678a85ed09c60b26300490dd69ef601849c1f4c01f78046bb8351f3a7888b8ce2213790ab11c5402c4a279cbc9a52e4bc76c4cc41600"),
                false,
            ),
            (
                "Test.\n",
                hex!("2c5954065af5f8c651cc46c49af719507648947a6100ef5c37294939a396c529551bd65c90c4aae0417cd3e621bcfb1d40630b6593a14589b94943efa50342310c23b07aa7acd102dc0b922272db0908509467d56ae3edc5d4ec71ba072f509d0f83d7bc1d88174c0c39a3587963c8625e606c3b99cf9a202da0c0b3677a0800"),
                false,
            ),
        ];
        let pub_key: RsaPublicKey = priv_key.into();

        for (text, sig, expected) in &tests {
            let result = verify(
                &pub_key,
                SignatureAlgorithm::Sha1WithRsa,
                text.as_bytes(),
                sig,
            );
            assert_eq!(result, *expected);
        }
    }

    #[test]
    fn every_algorithm_round_trips() {
        let priv_key = get_private_key();
        let pub_key = priv_key.to_public_key();

        for algorithm in SignatureAlgorithm::ALL {
            let sig = sign(&priv_key, algorithm, b"hello").unwrap();
            assert_eq!(sig.len(), pub_key.size());
            assert!(verify(&pub_key, algorithm, b"hello", &sig));
            assert!(!verify(&pub_key, algorithm, b"hellx", &sig));

            let mut tampered = sig.clone();
            tampered[20] ^= 0x01;
            assert!(!verify(&pub_key, algorithm, b"hello", &tampered));
        }
    }

    #[test]
    fn algorithm_is_bound_into_signature() {
        let priv_key = get_private_key();
        let pub_key = priv_key.to_public_key();

        let sig = sign(&priv_key, SignatureAlgorithm::Sha256WithRsa, b"hello").unwrap();
        assert!(!verify(
            &pub_key,
            SignatureAlgorithm::Sha512WithRsa,
            b"hello",
            &sig
        ));
    }

    #[test]
    fn malformed_signatures_are_false() {
        let priv_key = get_private_key();
        let pub_key = priv_key.to_public_key();
        let k = pub_key.size();
        let alg = SignatureAlgorithm::Sha256WithRsa;

        assert!(!verify(&pub_key, alg, b"hello", &[]));
        assert!(!verify(&pub_key, alg, b"hello", &vec![0x01; k - 1]));
        assert!(!verify(&pub_key, alg, b"hello", &vec![0xff; k]));
        assert!(!verify(&pub_key, alg, b"hello", &vec![0x00; k]));
    }

    #[test]
    fn key_too_small_for_digest() {
        // 512-bit modulus: 64 bytes, below the 94 needed for SHA-512.
        let mut rng = ChaCha8Rng::from_seed([8; 32]);
        let priv_key = RsaPrivateKey::new(&mut rng, 512).unwrap();

        assert!(matches!(
            sign(&priv_key, SignatureAlgorithm::Sha512WithRsa, b"hello"),
            Err(Error::Signing(_))
        ));
        assert!(sign(&priv_key, SignatureAlgorithm::Sha256WithRsa, b"hello").is_ok());
    }
}
