//! String level entry points.
//!
//! Keys travel as PEM text, binary data as standard Base64 and algorithms
//! by their identifier (`"SHA256withRSA"`, ...). Functions without an
//! algorithm argument use [`DEFAULT_SIGNATURE_ALGORITHM`].

use crate::algorithm::SignatureAlgorithm;
use crate::codec::{decode_base64, encode_base64};
use crate::config::{KeyConfig, DEFAULT_KEY_BITS, DEFAULT_SIGNATURE_ALGORITHM};
use crate::csr::{self, SubjectFields};
use crate::errors::{Error, Result};
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::keypair::{KeyPair, KeyPairPem};
use crate::{cipher, signing};

/// Generate a 2048-bit key pair.
pub fn generate() -> Result<KeyPairPem> {
    generate_keys(DEFAULT_KEY_BITS)
}

/// Generate a key pair with a `bits` long modulus.
pub fn generate_keys(bits: usize) -> Result<KeyPairPem> {
    KeyPair::generate_with_rng(&mut rand_core::OsRng, &KeyConfig::with_bits(bits))?.to_pem()
}

/// Encrypt UTF-8 `message`, returning Base64 ciphertext.
pub fn encrypt(message: &str, public_pem: &str) -> Result<String> {
    encrypt_bytes(message.as_bytes(), public_pem)
}

/// Encrypt Base64 `message`, returning Base64 ciphertext.
pub fn encrypt64(message: &str, public_pem: &str) -> Result<String> {
    let message = decode_base64(message)?;
    encrypt_bytes(&message, public_pem)
}

fn encrypt_bytes(message: &[u8], public_pem: &str) -> Result<String> {
    let public_key = RsaPublicKey::from_pem(public_pem)?;
    Ok(encode_base64(&cipher::encrypt(&public_key, message)?))
}

/// Decrypt Base64 `ciphertext` into UTF-8 text.
pub fn decrypt(ciphertext: &str, private_pem: &str) -> Result<String> {
    let plaintext = decrypt_bytes(ciphertext, private_pem)?;
    String::from_utf8(plaintext)
        .map_err(|_| Error::Encoding("decrypted message is not valid UTF-8".into()))
}

/// Decrypt Base64 `ciphertext`, returning the plaintext as Base64.
pub fn decrypt64(ciphertext: &str, private_pem: &str) -> Result<String> {
    Ok(encode_base64(&decrypt_bytes(ciphertext, private_pem)?))
}

fn decrypt_bytes(ciphertext: &str, private_pem: &str) -> Result<Vec<u8>> {
    let private_key = RsaPrivateKey::from_pem(private_pem)?;
    let ciphertext = decode_base64(ciphertext).map_err(|_| Error::Decryption)?;
    cipher::decrypt(&private_key, &ciphertext)
}

/// Sign UTF-8 `message` with SHA512withRSA, returning a Base64 signature.
pub fn sign(message: &str, private_pem: &str) -> Result<String> {
    sign_bytes(message.as_bytes(), private_pem, DEFAULT_SIGNATURE_ALGORITHM)
}

/// Sign UTF-8 `message` with the named algorithm.
pub fn sign_with_algorithm(message: &str, private_pem: &str, algorithm: &str) -> Result<String> {
    let algorithm = algorithm.parse()?;
    sign_bytes(message.as_bytes(), private_pem, algorithm)
}

/// Sign Base64 `message` with SHA512withRSA.
pub fn sign64(message: &str, private_pem: &str) -> Result<String> {
    let message = decode_base64(message)?;
    sign_bytes(&message, private_pem, DEFAULT_SIGNATURE_ALGORITHM)
}

/// Sign Base64 `message` with the named algorithm.
pub fn sign64_with_algorithm(message: &str, private_pem: &str, algorithm: &str) -> Result<String> {
    let algorithm = algorithm.parse()?;
    let message = decode_base64(message)?;
    sign_bytes(&message, private_pem, algorithm)
}

fn sign_bytes(message: &[u8], private_pem: &str, algorithm: SignatureAlgorithm) -> Result<String> {
    let private_key = RsaPrivateKey::from_pem(private_pem)?;
    let signature = signing::sign(&private_key, algorithm, message)?;
    Ok(encode_base64(&signature))
}

/// Check a Base64 `signature` over UTF-8 `message` made with SHA512withRSA.
pub fn verify(signature: &str, message: &str, public_pem: &str) -> Result<bool> {
    verify_bytes(
        signature,
        message.as_bytes(),
        public_pem,
        DEFAULT_SIGNATURE_ALGORITHM,
    )
}

/// Check a Base64 `signature` over UTF-8 `message` made with the named
/// algorithm.
pub fn verify_with_algorithm(
    signature: &str,
    message: &str,
    public_pem: &str,
    algorithm: &str,
) -> Result<bool> {
    let algorithm = algorithm.parse()?;
    verify_bytes(signature, message.as_bytes(), public_pem, algorithm)
}

/// Check a Base64 `signature` over Base64 `message` made with SHA512withRSA.
pub fn verify64(signature: &str, message: &str, public_pem: &str) -> Result<bool> {
    let message = decode_base64(message)?;
    verify_bytes(signature, &message, public_pem, DEFAULT_SIGNATURE_ALGORITHM)
}

/// Check a Base64 `signature` over Base64 `message` made with the named
/// algorithm.
pub fn verify64_with_algorithm(
    signature: &str,
    message: &str,
    public_pem: &str,
    algorithm: &str,
) -> Result<bool> {
    let algorithm = algorithm.parse()?;
    let message = decode_base64(message)?;
    verify_bytes(signature, &message, public_pem, algorithm)
}

fn verify_bytes(
    signature: &str,
    message: &[u8],
    public_pem: &str,
    algorithm: SignatureAlgorithm,
) -> Result<bool> {
    let public_key = RsaPublicKey::from_pem(public_pem)?;
    let signature = match decode_base64(signature) {
        Ok(signature) => signature,
        Err(_) => return Ok(false),
    };
    Ok(signing::verify(&public_key, algorithm, message, &signature))
}

/// DER encoded PKCS#10 request for `subject`, signed by the private key and
/// carrying the public key. Both must belong to the same pair.
pub fn create_csr(private_pem: &str, public_pem: &str, subject: &SubjectFields) -> Result<Vec<u8>> {
    let private_key = RsaPrivateKey::from_pem(private_pem)?;
    let public_key = RsaPublicKey::from_pem(public_pem)?;
    csr::build_csr(&private_key, &public_key, subject)
}

/// Algorithm identifiers advertised to callers, as name/value pairs.
pub fn constants() -> [(&'static str, &'static str); 2] {
    let sha256 = SignatureAlgorithm::Sha256WithRsa.name();
    let sha512 = SignatureAlgorithm::Sha512WithRsa.name();
    [(sha256, sha256), (sha512, sha512)]
}
