//! Key generation parameters and crate-wide defaults.

use num_bigint::BigUint;

use crate::algorithm::SignatureAlgorithm;
use crate::errors::{Error, Result};

/// Modulus size used when the caller does not ask for one.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Smallest modulus [`KeyConfig`] accepts for generation.
pub const MIN_KEY_BITS: usize = 512;

/// Largest modulus accepted for generation and import.
pub const MAX_KEY_BITS: usize = 16384;

/// Largest public exponent accepted for generation and import, 2^33 - 1.
pub const MAX_PUB_EXPONENT: u64 = (1 << 33) - 1;

/// Public exponent of generated keys (F4).
pub const DEFAULT_PUBLIC_EXPONENT: u64 = 65537;

/// Algorithm used by the signing entry points that take no algorithm.
pub const DEFAULT_SIGNATURE_ALGORITHM: SignatureAlgorithm = SignatureAlgorithm::Sha512WithRsa;

/// Algorithm certification requests are signed with.
pub const CSR_SIGNATURE_ALGORITHM: SignatureAlgorithm = SignatureAlgorithm::Sha1WithRsa;

/// Parameters for generating a key pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyConfig {
    /// Modulus size in bits.
    pub bits: usize,
    /// Public exponent.
    pub public_exponent: u64,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            bits: DEFAULT_KEY_BITS,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
        }
    }
}

impl KeyConfig {
    /// Default parameters with the given modulus size.
    pub fn with_bits(bits: usize) -> Self {
        Self {
            bits,
            ..Self::default()
        }
    }

    /// Check the parameters against the supported ranges.
    pub fn validate(&self) -> Result<()> {
        if self.bits < MIN_KEY_BITS {
            return Err(Error::KeyGeneration(format!(
                "{} bit keys are below the {MIN_KEY_BITS} bit minimum",
                self.bits
            )));
        }
        if self.bits > MAX_KEY_BITS {
            return Err(Error::KeyGeneration(format!(
                "{} bit keys exceed the {MAX_KEY_BITS} bit maximum",
                self.bits
            )));
        }
        if self.public_exponent < 3 || self.public_exponent % 2 == 0 {
            return Err(Error::KeyGeneration(format!(
                "public exponent {} must be odd and at least 3",
                self.public_exponent
            )));
        }
        if self.public_exponent > MAX_PUB_EXPONENT {
            return Err(Error::KeyGeneration(format!(
                "public exponent {} exceeds the {MAX_PUB_EXPONENT} maximum",
                self.public_exponent
            )));
        }
        Ok(())
    }

    pub(crate) fn exponent(&self) -> BigUint {
        BigUint::from(self.public_exponent)
    }
}
