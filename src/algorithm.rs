//! Signature algorithm identifiers.

use core::fmt;
use core::str::FromStr;

use const_oid::{AssociatedOid, ObjectIdentifier};
use digest::Digest;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

use crate::algorithms::pkcs1v15::pkcs1v15_generate_prefix;
use crate::errors::{Error, Result};

/// `sha1WithRSAEncryption`
pub const SHA1_WITH_RSA_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");
/// `sha224WithRSAEncryption`
pub const SHA224_WITH_RSA_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.14");
/// `sha256WithRSAEncryption`
pub const SHA256_WITH_RSA_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
/// `sha384WithRSAEncryption`
pub const SHA384_WITH_RSA_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
/// `sha512WithRSAEncryption`
pub const SHA512_WITH_RSA_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");

/// PKCS#1 v1.5 signature algorithm: a digest paired with RSA.
///
/// Parsed from and displayed as the Java-style identifiers
/// (`"SHA256withRSA"`, ...).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SignatureAlgorithm {
    /// SHA-1 digest.
    #[cfg_attr(feature = "serde", serde(rename = "SHA1withRSA"))]
    Sha1WithRsa,
    /// SHA-224 digest.
    #[cfg_attr(feature = "serde", serde(rename = "SHA224withRSA"))]
    Sha224WithRsa,
    /// SHA-256 digest.
    #[cfg_attr(feature = "serde", serde(rename = "SHA256withRSA"))]
    Sha256WithRsa,
    /// SHA-384 digest.
    #[cfg_attr(feature = "serde", serde(rename = "SHA384withRSA"))]
    Sha384WithRsa,
    /// SHA-512 digest.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "SHA512withRSA"))]
    Sha512WithRsa,
}

impl SignatureAlgorithm {
    /// Every supported algorithm, weakest digest first.
    pub const ALL: [SignatureAlgorithm; 5] = [
        SignatureAlgorithm::Sha1WithRsa,
        SignatureAlgorithm::Sha224WithRsa,
        SignatureAlgorithm::Sha256WithRsa,
        SignatureAlgorithm::Sha384WithRsa,
        SignatureAlgorithm::Sha512WithRsa,
    ];

    /// Identifier string of the algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1WithRsa => "SHA1withRSA",
            SignatureAlgorithm::Sha224WithRsa => "SHA224withRSA",
            SignatureAlgorithm::Sha256WithRsa => "SHA256withRSA",
            SignatureAlgorithm::Sha384WithRsa => "SHA384withRSA",
            SignatureAlgorithm::Sha512WithRsa => "SHA512withRSA",
        }
    }

    /// `sha*WithRSAEncryption` object identifier.
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            SignatureAlgorithm::Sha1WithRsa => SHA1_WITH_RSA_OID,
            SignatureAlgorithm::Sha224WithRsa => SHA224_WITH_RSA_OID,
            SignatureAlgorithm::Sha256WithRsa => SHA256_WITH_RSA_OID,
            SignatureAlgorithm::Sha384WithRsa => SHA384_WITH_RSA_OID,
            SignatureAlgorithm::Sha512WithRsa => SHA512_WITH_RSA_OID,
        }
    }

    /// Object identifier of the digest alone.
    pub fn digest_oid(&self) -> ObjectIdentifier {
        match self {
            SignatureAlgorithm::Sha1WithRsa => Sha1::OID,
            SignatureAlgorithm::Sha224WithRsa => Sha224::OID,
            SignatureAlgorithm::Sha256WithRsa => Sha256::OID,
            SignatureAlgorithm::Sha384WithRsa => Sha384::OID,
            SignatureAlgorithm::Sha512WithRsa => Sha512::OID,
        }
    }

    /// Digest output length in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            SignatureAlgorithm::Sha1WithRsa => <Sha1 as Digest>::output_size(),
            SignatureAlgorithm::Sha224WithRsa => <Sha224 as Digest>::output_size(),
            SignatureAlgorithm::Sha256WithRsa => <Sha256 as Digest>::output_size(),
            SignatureAlgorithm::Sha384WithRsa => <Sha384 as Digest>::output_size(),
            SignatureAlgorithm::Sha512WithRsa => <Sha512 as Digest>::output_size(),
        }
    }

    /// Hashes `msg` with the algorithm's digest.
    pub fn digest(&self, msg: &[u8]) -> Vec<u8> {
        match self {
            SignatureAlgorithm::Sha1WithRsa => Sha1::digest(msg).to_vec(),
            SignatureAlgorithm::Sha224WithRsa => Sha224::digest(msg).to_vec(),
            SignatureAlgorithm::Sha256WithRsa => Sha256::digest(msg).to_vec(),
            SignatureAlgorithm::Sha384WithRsa => Sha384::digest(msg).to_vec(),
            SignatureAlgorithm::Sha512WithRsa => Sha512::digest(msg).to_vec(),
        }
    }

    /// DER `DigestInfo` header placed in front of the digest.
    pub(crate) fn digest_info_prefix(&self) -> Vec<u8> {
        match self {
            SignatureAlgorithm::Sha1WithRsa => pkcs1v15_generate_prefix::<Sha1>(),
            SignatureAlgorithm::Sha224WithRsa => pkcs1v15_generate_prefix::<Sha224>(),
            SignatureAlgorithm::Sha256WithRsa => pkcs1v15_generate_prefix::<Sha256>(),
            SignatureAlgorithm::Sha384WithRsa => pkcs1v15_generate_prefix::<Sha384>(),
            SignatureAlgorithm::Sha512WithRsa => pkcs1v15_generate_prefix::<Sha512>(),
        }
    }

    /// Smallest modulus, in bytes, able to carry this algorithm's signature.
    pub fn min_key_size(&self) -> usize {
        self.digest_info_prefix().len() + self.digest_len() + 11
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SignatureAlgorithm::ALL
            .iter()
            .copied()
            .find(|alg| alg.name() == s)
            .ok_or_else(|| {
                tracing::warn!(algorithm = s, "rejected unknown signature algorithm");
                Error::UnsupportedAlgorithm(s.to_owned())
            })
    }
}
