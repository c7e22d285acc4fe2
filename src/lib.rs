#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Usage
//!
//! ## PKCS#1 v1.5 encryption
//!
//! ```
//! use rsa_keychain::KeyPair;
//!
//! let pair = KeyPair::generate(2048).expect("failed to generate a key");
//!
//! // Encrypt
//! let data = b"hello world";
//! let enc_data = pair.encrypt(&data[..]).expect("failed to encrypt");
//! assert_ne!(&data[..], &enc_data[..]);
//!
//! // Decrypt
//! let dec_data = pair.decrypt(&enc_data).expect("failed to decrypt");
//! assert_eq!(&data[..], &dec_data[..]);
//! ```
//!
//! ## PKCS#1 v1.5 signatures
//!
//! The digest is picked with [`SignatureAlgorithm`], either directly or by
//! parsing its identifier.
//!
//! ```
//! use rsa_keychain::{RsaPrivateKey, SignatureAlgorithm};
//!
//! let mut rng = rsa_keychain::rand_core::OsRng;
//! let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("failed to generate a key");
//! let public_key = private_key.to_public_key();
//!
//! let algorithm: SignatureAlgorithm = "SHA256withRSA".parse().unwrap();
//! let signature = private_key.sign(algorithm, b"hello world").unwrap();
//!
//! assert!(public_key.verify(algorithm, b"hello world", &signature));
//! assert!(!public_key.verify(algorithm, b"hello wrld", &signature));
//! ```
//!
//! ## PEM key encoding
//!
//! Public keys are exported as X.509 `SubjectPublicKeyInfo` (`PUBLIC KEY`)
//! and private keys as PKCS#1 (`RSA PRIVATE KEY`). Import also accepts
//! `RSA PUBLIC KEY` and PKCS#8 `PRIVATE KEY` documents.
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use rsa_keychain::RsaPublicKey;
//!
//! let pem = "-----BEGIN PUBLIC KEY-----
//! MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAtsQsUV8QpqrygsY+2+JC
//! Q6Fw8/omM71IM2N/R8pPbzbgOl0p78MZGsgPOQ2HSznjD0FPzsH8oO2B5Uftws04
//! LHb2HJAYlz25+lN5cqfHAfa3fgmC38FfwBkn7l582UtPWZ/wcBOnyCgb3yLcvJrX
//! yrt8QxHJgvWO23ITrUVYszImbXQ67YGS0YhMrbixRzmo2tpm3JcIBtnHrEUMsT0N
//! fFdfsZhTT8YbxBvA8FdODgEwx7u/vf3J9qbi4+Kv8cvqyJuleIRSjVXPsIMnoejI
//! n04APPKIjpMyQdnWlby7rNyQtE4+CV+jcFjqJbE/Xilcvqxt6DirjFCvYeKYl1uH
//! LwIDAQAB
//! -----END PUBLIC KEY-----";
//!
//! let public_key = RsaPublicKey::from_pem(pem)?;
//! let exported = public_key.to_pem()?;
//! assert_eq!(RsaPublicKey::from_pem(&exported)?, public_key);
//! # Ok(())
//! # }
//! ```
//!
//! ## Certification requests
//!
//! ```
//! use rsa_keychain::{KeyPair, SubjectFields};
//!
//! let pair = KeyPair::generate(2048).unwrap();
//! let subject = SubjectFields::from_pairs([("commonName", "Jane Doe"), ("country", "NL")]);
//!
//! let der = pair.create_csr(&subject).unwrap();
//! assert!(rsa_keychain::csr::verify_csr(&der));
//! ```
//!
//! ## Text interface
//!
//! [`text`] wraps the operations above for callers that pass PEM keys,
//! Base64 data and algorithm names around as strings.

pub use num_bigint::BigUint;
pub use rand_core;

mod algorithms;
pub mod algorithm;
pub mod cipher;
pub mod codec;
pub mod config;
pub mod csr;
pub mod errors;
pub mod keypair;
pub mod signing;
pub mod text;
pub mod traits;

mod encoding;
mod key;

pub use pkcs1;
pub use pkcs8;

pub use crate::{
    algorithm::SignatureAlgorithm,
    config::KeyConfig,
    csr::SubjectFields,
    encoding::{
        PKCS1_PRIVATE_KEY_LABEL, PKCS1_PUBLIC_KEY_LABEL, PKCS8_PRIVATE_KEY_LABEL,
        SPKI_PUBLIC_KEY_LABEL,
    },
    errors::{Error, KeyHalf, Result},
    key::{RsaPrivateKey, RsaPublicKey},
    keypair::{KeyPair, KeyPairPem},
    traits::{PrivateKeyParts, PublicKeyParts},
};
