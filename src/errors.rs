//! Error types.

use core::fmt;

/// Alias for [`core::result::Result`] with the `rsa-keychain` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Which half of a key pair an operation needed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyHalf {
    /// The public key.
    Public,
    /// The private key.
    Private,
}

impl fmt::Display for KeyHalf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyHalf::Public => f.write_str("public"),
            KeyHalf::Private => f.write_str("private"),
        }
    }
}

/// Error types
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// Key generation was refused or could not complete.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// PEM or DER input did not contain a usable RSA key.
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// The operation needs a key half that was not loaded.
    #[error("missing {0} key")]
    MissingKey(KeyHalf),

    /// Public and private halves belong to different key pairs.
    #[error("public and private keys do not belong to the same key pair")]
    KeyMismatch,

    /// Plaintext does not fit into a single padded RSA block.
    #[error("message too large: {len} bytes, at most {max} allowed")]
    MessageTooLarge {
        /// Length of the rejected message.
        len: usize,
        /// Capacity of the key, modulus bytes minus padding overhead.
        max: usize,
    },

    /// Ciphertext could not be decrypted. Carries no detail on purpose.
    #[error("decryption error")]
    Decryption,

    /// The signature algorithm identifier is not recognized.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A signature could not be produced.
    #[error("signing error: {0}")]
    Signing(String),

    /// Base64 or UTF-8 framing of a message was invalid.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl Error {
    /// Stable name of the error kind, suitable as a rejection code at a
    /// language boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::KeyGeneration(_) => "KeyGenerationError",
            Error::InvalidKeyFormat(_) => "InvalidKeyFormat",
            Error::MissingKey(_) => "MissingKey",
            Error::KeyMismatch => "KeyMismatch",
            Error::MessageTooLarge { .. } => "MessageTooLarge",
            Error::Decryption => "DecryptionError",
            Error::UnsupportedAlgorithm(_) => "UnsupportedAlgorithm",
            Error::Signing(_) => "SigningError",
            Error::Encoding(_) => "EncodingError",
        }
    }
}

impl From<pkcs1::Error> for Error {
    fn from(err: pkcs1::Error) -> Error {
        Error::InvalidKeyFormat(err.to_string())
    }
}

impl From<pkcs8::Error> for Error {
    fn from(err: pkcs8::Error) -> Error {
        Error::InvalidKeyFormat(err.to_string())
    }
}

impl From<pkcs8::spki::Error> for Error {
    fn from(err: pkcs8::spki::Error) -> Error {
        Error::InvalidKeyFormat(err.to_string())
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        Error::InvalidKeyFormat(err.to_string())
    }
}

impl From<pem_rfc7468::Error> for Error {
    fn from(err: pem_rfc7468::Error) -> Error {
        Error::InvalidKeyFormat(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_boundary_codes() {
        assert_eq!(Error::Decryption.kind(), "DecryptionError");
        assert_eq!(
            Error::MissingKey(KeyHalf::Private).to_string(),
            "missing private key"
        );
        assert_eq!(
            Error::MessageTooLarge { len: 300, max: 245 }.to_string(),
            "message too large: 300 bytes, at most 245 allowed"
        );
        assert_eq!(Error::KeyGeneration("x".into()).kind(), "KeyGenerationError");
    }
}
