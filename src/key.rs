use core::fmt;

use num_bigint::{BigUint, ModInverse};
use num_traits::{One, ToPrimitive, Zero};
use rand_core::{CryptoRngCore, OsRng};
use zeroize::Zeroize;

use crate::algorithm::SignatureAlgorithm;
use crate::algorithms::generate::generate_key_with_exp;
use crate::config::{KeyConfig, MAX_KEY_BITS, MAX_PUB_EXPONENT};
use crate::errors::{Error, Result};
use crate::traits::{PrivateKeyParts, PublicKeyParts};
use crate::{cipher, signing};

/// Smallest public exponent accepted on import.
const MIN_PUB_EXPONENT: u64 = 2;

/// Represents the public part of an RSA key.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct RsaPublicKey {
    /// Modulus: product of prime numbers `p` and `q`
    n: BigUint,
    /// Public exponent: power to which a plaintext message is raised in
    /// order to encrypt it.
    ///
    /// Typically 0x10001 (65537)
    e: BigUint,
}

/// Represents a whole RSA key, public and private parts.
#[derive(Clone)]
pub struct RsaPrivateKey {
    /// Public components of the private key.
    pubkey_components: RsaPublicKey,
    /// Private exponent
    d: BigUint,
    /// Prime factors of N, exactly two elements.
    primes: Vec<BigUint>,
    /// precomputed values to speed up private operations
    precomputed: Option<PrecomputedValues>,
}

#[derive(Clone)]
pub(crate) struct PrecomputedValues {
    /// D mod (P-1)
    pub(crate) dp: BigUint,
    /// D mod (Q-1)
    pub(crate) dq: BigUint,
    /// Q^-1 mod P
    pub(crate) qinv: BigUint,
}

impl Zeroize for PrecomputedValues {
    fn zeroize(&mut self) {
        self.dp.zeroize();
        self.dq.zeroize();
        self.qinv.zeroize();
    }
}

impl Drop for PrecomputedValues {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl Eq for RsaPrivateKey {}
impl PartialEq for RsaPrivateKey {
    #[inline]
    fn eq(&self, other: &RsaPrivateKey) -> bool {
        self.pubkey_components == other.pubkey_components
            && self.d == other.d
            && self.primes == other.primes
    }
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("n", self.n())
            .field("e", self.e())
            .finish_non_exhaustive()
    }
}

impl AsRef<RsaPublicKey> for RsaPrivateKey {
    fn as_ref(&self) -> &RsaPublicKey {
        &self.pubkey_components
    }
}

impl Zeroize for RsaPrivateKey {
    fn zeroize(&mut self) {
        self.d.zeroize();
        for prime in self.primes.iter_mut() {
            prime.zeroize();
        }
        self.primes.clear();
        if let Some(mut precomputed) = self.precomputed.take() {
            precomputed.zeroize();
        }
    }
}

impl Drop for RsaPrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl From<RsaPrivateKey> for RsaPublicKey {
    fn from(private_key: RsaPrivateKey) -> Self {
        (&private_key).into()
    }
}

impl From<&RsaPrivateKey> for RsaPublicKey {
    fn from(private_key: &RsaPrivateKey) -> Self {
        private_key.to_public_key()
    }
}

impl PublicKeyParts for RsaPublicKey {
    fn n(&self) -> &BigUint {
        &self.n
    }

    fn e(&self) -> &BigUint {
        &self.e
    }
}

impl RsaPublicKey {
    /// Create a new public key from its components.
    ///
    /// Rejects moduli above [`MAX_KEY_BITS`] and exponents outside
    /// `[2, 2^33 - 1]` or not below the modulus.
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        let k = Self { n, e };
        check_public(&k)?;
        Ok(k)
    }

    /// Encrypt `msg` with PKCS#1 v1.5 padding, drawing the padding string
    /// from the operating system's random source.
    pub fn encrypt(&self, msg: &[u8]) -> Result<Vec<u8>> {
        cipher::encrypt_with_rng(&mut OsRng, self, msg)
    }

    /// Encrypt `msg` with PKCS#1 v1.5 padding using `rng` for the padding string.
    pub fn encrypt_with_rng<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        msg: &[u8],
    ) -> Result<Vec<u8>> {
        cipher::encrypt_with_rng(rng, self, msg)
    }

    /// Check a PKCS#1 v1.5 signature over `msg`.
    pub fn verify(&self, algorithm: SignatureAlgorithm, msg: &[u8], sig: &[u8]) -> bool {
        signing::verify(self, algorithm, msg, sig)
    }
}

impl PublicKeyParts for RsaPrivateKey {
    fn n(&self) -> &BigUint {
        &self.pubkey_components.n
    }

    fn e(&self) -> &BigUint {
        &self.pubkey_components.e
    }
}

impl RsaPrivateKey {
    /// Generate a new Rsa key pair of the given bit size using the passed in `rng`.
    pub fn new<R: CryptoRngCore + ?Sized>(rng: &mut R, bit_size: usize) -> Result<RsaPrivateKey> {
        Self::new_with_config(rng, &KeyConfig::with_bits(bit_size))
    }

    /// Generate a new RSA key pair with the modulus size and public exponent
    /// of `config`.
    pub fn new_with_config<R: CryptoRngCore + ?Sized>(
        rng: &mut R,
        config: &KeyConfig,
    ) -> Result<RsaPrivateKey> {
        if let Err(err) = config.validate() {
            tracing::warn!(bits = config.bits, "rejected key generation parameters");
            return Err(err);
        }

        let mut probe = [0u8; 1];
        rng.try_fill_bytes(&mut probe)
            .map_err(|err| Error::KeyGeneration(format!("random source failed: {err}")))?;

        let components = generate_key_with_exp(rng, config.bits, &config.exponent())?;
        tracing::debug!(bits = config.bits, "generated RSA key pair");
        RsaPrivateKey::from_components(
            components.n,
            components.e,
            components.d,
            components.primes,
        )
    }

    /// Constructs an RSA key pair from individual components:
    ///
    /// - `n`: RSA modulus
    /// - `e`: public exponent (i.e. encrypting exponent)
    /// - `d`: private exponent (i.e. decrypting exponent)
    /// - `primes`: the two prime factors of `n`
    ///
    /// Keys with more than two primes are rejected.
    pub fn from_components(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        primes: Vec<BigUint>,
    ) -> Result<RsaPrivateKey> {
        if primes.len() != 2 {
            return Err(Error::InvalidKeyFormat(format!(
                "expected two prime factors, found {}",
                primes.len()
            )));
        }

        let mut k = Self::from_components_unchecked(n, e, d, primes);
        k.validate()?;
        k.precompute()?;
        Ok(k)
    }

    /// Assembles a key without validating it. Precomputation is attempted
    /// and silently skipped when the primes do not allow it.
    pub(crate) fn from_components_unchecked(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        primes: Vec<BigUint>,
    ) -> RsaPrivateKey {
        let mut k = RsaPrivateKey {
            pubkey_components: RsaPublicKey { n, e },
            d,
            primes,
            precomputed: None,
        };

        let _ = k.precompute();

        k
    }

    /// Get the public key from the private key, cloning `n` and `e`.
    ///
    /// Generally this is not needed since `RsaPrivateKey` implements the `PublicKeyParts` trait,
    /// but it can occasionally be useful to discard the private information entirely.
    pub fn to_public_key(&self) -> RsaPublicKey {
        self.pubkey_components.clone()
    }

    /// Whether `public` carries the same modulus and exponent as this key.
    pub fn matches(&self, public: &RsaPublicKey) -> bool {
        self.pubkey_components == *public
    }

    /// Performs some calculations to speed up private key operations.
    pub fn precompute(&mut self) -> Result<()> {
        if self.precomputed.is_some() {
            return Ok(());
        }
        if self.primes.len() < 2 {
            return Err(Error::InvalidKeyFormat("missing prime factors".into()));
        }
        if self.primes.iter().any(|prime| *prime <= BigUint::one()) {
            return Err(Error::InvalidKeyFormat("invalid prime value".into()));
        }

        let dp = &self.d % (&self.primes[0] - BigUint::one());
        let dq = &self.d % (&self.primes[1] - BigUint::one());
        let qinv = self
            .crt_coefficient()
            .ok_or_else(|| Error::InvalidKeyFormat("invalid CRT coefficient".into()))?;

        self.precomputed = Some(PrecomputedValues { dp, dq, qinv });

        Ok(())
    }

    /// Clears precomputed values by setting to None
    pub fn clear_precomputed(&mut self) {
        if let Some(mut precomputed) = self.precomputed.take() {
            precomputed.zeroize();
        }
    }

    /// Compute CRT coefficient: `(1/q) mod p`.
    pub fn crt_coefficient(&self) -> Option<BigUint> {
        if self.primes.len() < 2 {
            return None;
        }
        (&self.primes[1])
            .mod_inverse(&self.primes[0])?
            .to_biguint()
    }

    /// Performs basic sanity checks on the key.
    /// Returns `Ok(())` if everything is good, otherwise an appropriate error.
    pub fn validate(&self) -> Result<()> {
        check_public(self)?;

        // Check that Πprimes == n.
        let mut m = BigUint::one();
        for prime in &self.primes {
            // Any primes ≤ 1 will cause divide-by-zero panics later.
            if *prime <= BigUint::one() {
                return Err(Error::InvalidKeyFormat("invalid prime value".into()));
            }
            m *= prime;
        }
        if m != *self.n() {
            return Err(Error::InvalidKeyFormat(
                "primes do not multiply to the modulus".into(),
            ));
        }

        // Check that de ≡ 1 mod p-1, for each prime.
        // This implies that e is coprime to each p-1 as e has a multiplicative
        // inverse. Therefore e is coprime to lcm(p-1,q-1,r-1,...) =
        // exponent(ℤ/nℤ). It also implies that a^de ≡ a mod p as a^(p-1) ≡ 1
        // mod p. Thus a^de ≡ a mod n for all a coprime to n, as required.
        let mut de = self.e().clone();
        de *= self.d();
        for prime in &self.primes {
            let congruence: BigUint = &de % (prime - BigUint::one());
            if !congruence.is_one() {
                return Err(Error::InvalidKeyFormat(
                    "private exponent does not invert the public exponent".into(),
                ));
            }
        }

        Ok(())
    }

    /// Decrypt a PKCS#1 v1.5 ciphertext. The private operation is blinded
    /// with randomness from the operating system.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        cipher::decrypt_with_rng(&mut OsRng, self, ciphertext)
    }

    /// Decrypt a PKCS#1 v1.5 ciphertext, blinding with `rng`.
    pub fn decrypt_with_rng<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        cipher::decrypt_with_rng(rng, self, ciphertext)
    }

    /// Sign `msg` with PKCS#1 v1.5 padding using `algorithm`.
    pub fn sign(&self, algorithm: SignatureAlgorithm, msg: &[u8]) -> Result<Vec<u8>> {
        signing::sign(self, algorithm, msg)
    }

    /// Sign `msg`, blinding the private operation with `rng`.
    pub fn sign_with_rng<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        algorithm: SignatureAlgorithm,
        msg: &[u8],
    ) -> Result<Vec<u8>> {
        signing::sign_with_rng(rng, self, algorithm, msg)
    }
}

impl PrivateKeyParts for RsaPrivateKey {
    fn d(&self) -> &BigUint {
        &self.d
    }

    fn primes(&self) -> &[BigUint] {
        &self.primes
    }

    fn dp(&self) -> Option<&BigUint> {
        self.precomputed.as_ref().map(|p| &p.dp)
    }

    fn dq(&self) -> Option<&BigUint> {
        self.precomputed.as_ref().map(|p| &p.dq)
    }

    fn qinv(&self) -> Option<&BigUint> {
        self.precomputed.as_ref().map(|p| &p.qinv)
    }
}

/// Check that the public key is well formed and has an exponent within acceptable bounds.
#[inline]
pub(crate) fn check_public(public_key: &impl PublicKeyParts) -> Result<()> {
    if public_key.n().is_zero() {
        return Err(Error::InvalidKeyFormat("modulus is zero".into()));
    }

    if public_key.n().bits() > MAX_KEY_BITS {
        return Err(Error::InvalidKeyFormat(format!(
            "modulus exceeds {MAX_KEY_BITS} bits"
        )));
    }

    let e = public_key
        .e()
        .to_u64()
        .ok_or_else(|| Error::InvalidKeyFormat("public exponent too large".into()))?;

    if e < MIN_PUB_EXPONENT {
        return Err(Error::InvalidKeyFormat("public exponent too small".into()));
    }

    if e > MAX_PUB_EXPONENT {
        return Err(Error::InvalidKeyFormat("public exponent too large".into()));
    }

    if public_key.e() >= public_key.n() {
        return Err(Error::InvalidKeyFormat(
            "public exponent is not below the modulus".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
    use rand_core::{CryptoRng, RngCore};

    /// Random source whose every draw fails.
    struct UnavailableRng;

    impl RngCore for UnavailableRng {
        fn next_u32(&mut self) -> u32 {
            panic!("random source is unavailable")
        }

        fn next_u64(&mut self) -> u64 {
            panic!("random source is unavailable")
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("random source is unavailable")
        }

        fn try_fill_bytes(
            &mut self,
            _dest: &mut [u8],
        ) -> core::result::Result<(), rand_core::Error> {
            Err(rand_core::Error::new("random source is unavailable"))
        }
    }

    impl CryptoRng for UnavailableRng {}

    #[test]
    fn test_from_into() {
        let private_key = RsaPrivateKey::from_components_unchecked(
            BigUint::from_u64(100).unwrap(),
            BigUint::from_u64(200).unwrap(),
            BigUint::from_u64(123).unwrap(),
            vec![],
        );
        let public_key: RsaPublicKey = private_key.into();

        assert_eq!(public_key.n().to_u64(), Some(100));
        assert_eq!(public_key.e().to_u64(), Some(200));
    }

    fn test_key_basics(private_key: &RsaPrivateKey) {
        private_key.validate().expect("invalid private key");

        assert!(
            private_key.d() < private_key.n(),
            "private exponent too large"
        );

        let pub_key: RsaPublicKey = private_key.into();
        let m = BigUint::from_u64(42).expect("invalid 42");
        let c = crate::algorithms::rsa::rsa_encrypt(&pub_key, &m);
        let m2 = crate::algorithms::rsa::rsa_decrypt_and_check(
            private_key,
            None::<&mut ChaCha8Rng>,
            &c,
        )
        .expect("unable to decrypt without blinding");
        assert_eq!(m, m2);
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let m3 = crate::algorithms::rsa::rsa_decrypt_and_check(private_key, Some(&mut rng), &c)
            .expect("unable to decrypt with blinding");
        assert_eq!(m, m3);
    }

    macro_rules! key_generation {
        ($name:ident, $size:expr) => {
            #[test]
            fn $name() {
                let mut rng = ChaCha8Rng::from_seed([42; 32]);

                for _ in 0..5 {
                    let private_key = RsaPrivateKey::new(&mut rng, $size).unwrap();
                    assert_eq!(private_key.n().bits(), $size);
                    assert_eq!(private_key.primes().len(), 2);
                    assert!(private_key.dp().is_some());

                    test_key_basics(&private_key);
                }
            }
        };
    }

    key_generation!(key_generation_512, 512);
    key_generation!(key_generation_1024, 1024);

    #[test]
    fn generation_rejects_small_sizes() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        assert!(matches!(
            RsaPrivateKey::new(&mut rng, 256),
            Err(Error::KeyGeneration(_))
        ));
        assert!(matches!(
            RsaPrivateKey::new(&mut rng, MAX_KEY_BITS + 8),
            Err(Error::KeyGeneration(_))
        ));
    }

    #[test]
    fn generation_honors_public_exponent() {
        let mut rng = ChaCha8Rng::from_seed([3; 32]);
        let config = KeyConfig {
            bits: 512,
            public_exponent: 3,
        };
        let key = RsaPrivateKey::new_with_config(&mut rng, &config).unwrap();
        assert_eq!(key.e(), &BigUint::from(3u8));
        test_key_basics(&key);
    }

    #[test]
    fn generation_rejects_oversized_public_exponent() {
        let mut rng = ChaCha8Rng::from_seed([3; 32]);
        let config = KeyConfig {
            bits: 512,
            public_exponent: (1 << 40) + 15,
        };
        assert!(matches!(
            RsaPrivateKey::new_with_config(&mut rng, &config),
            Err(Error::KeyGeneration(_))
        ));
    }

    #[test]
    fn generation_fails_without_randomness() {
        assert!(matches!(
            RsaPrivateKey::new(&mut UnavailableRng, 512),
            Err(Error::KeyGeneration(_))
        ));
    }

    #[test]
    fn key_types_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<RsaPublicKey>();
        assert_send_sync::<RsaPrivateKey>();
        assert_send_sync::<crate::keypair::KeyPair>();
    }

    #[test]
    fn test_negative_decryption_value() {
        let private_key = RsaPrivateKey::from_components(
            BigUint::from_bytes_le(&[
                99, 192, 208, 179, 0, 220, 7, 29, 49, 151, 75, 107, 75, 73, 200, 180,
            ]),
            BigUint::from_bytes_le(&[1, 0, 1]),
            BigUint::from_bytes_le(&[
                81, 163, 254, 144, 171, 159, 144, 42, 244, 133, 51, 249, 28, 12, 63, 65,
            ]),
            vec![
                BigUint::from_bytes_le(&[105, 101, 60, 173, 19, 153, 3, 192]),
                BigUint::from_bytes_le(&[235, 65, 160, 134, 32, 136, 6, 241]),
            ],
        )
        .unwrap();

        for _ in 0..1000 {
            test_key_basics(&private_key);
        }
    }

    #[test]
    fn rejects_inconsistent_components() {
        let n = BigUint::from(3233u32);
        let e = BigUint::from(17u32);
        let primes = vec![BigUint::from(61u32), BigUint::from(53u32)];

        assert!(RsaPrivateKey::from_components(
            n.clone(),
            e.clone(),
            BigUint::from(2753u32),
            primes.clone()
        )
        .is_ok());

        // wrong private exponent
        assert!(matches!(
            RsaPrivateKey::from_components(
                n.clone(),
                e.clone(),
                BigUint::from(2751u32),
                primes.clone()
            ),
            Err(Error::InvalidKeyFormat(_))
        ));

        // primes do not multiply to n
        assert!(RsaPrivateKey::from_components(
            BigUint::from(3239u32),
            e.clone(),
            BigUint::from(2753u32),
            primes.clone()
        )
        .is_err());

        // three primes
        let mut three = primes;
        three.push(BigUint::from(7u32));
        assert!(RsaPrivateKey::from_components(n, e, BigUint::from(2753u32), three).is_err());
    }

    #[test]
    fn public_exponent_limits() {
        let n = BigUint::from_bytes_be(&[0xc5; 64]);
        assert!(RsaPublicKey::new(n.clone(), BigUint::from(65537u32)).is_ok());
        assert!(RsaPublicKey::new(n.clone(), BigUint::from(2u32)).is_ok());
        assert!(RsaPublicKey::new(n.clone(), BigUint::from(1u32)).is_err());
        assert!(RsaPublicKey::new(n.clone(), BigUint::from(MAX_PUB_EXPONENT)).is_ok());
        assert!(RsaPublicKey::new(n, BigUint::from(MAX_PUB_EXPONENT + 1)).is_err());
        assert!(RsaPublicKey::new(BigUint::from(11u32), BigUint::from(17u32)).is_err());
        assert!(RsaPublicKey::new(BigUint::zero(), BigUint::from(3u32)).is_err());
    }

    #[test]
    fn rejects_oversized_modulus() {
        let n = BigUint::one() << (MAX_KEY_BITS + 1);
        assert!(matches!(
            RsaPublicKey::new(n, BigUint::from(65537u32)),
            Err(Error::InvalidKeyFormat(_))
        ));
    }

    #[test]
    fn debug_hides_private_material() {
        let key = RsaPrivateKey::from_components(
            BigUint::from(3233u32),
            BigUint::from(17u32),
            BigUint::from(2753u32),
            vec![BigUint::from(61u32), BigUint::from(53u32)],
        )
        .unwrap();
        let debug = format!("{key:?}");
        assert!(debug.starts_with("RsaPrivateKey"));
        assert!(!debug.contains("2753"));
        assert!(key.matches(&RsaPublicKey::from(&key)));
    }
}
