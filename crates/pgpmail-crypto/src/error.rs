//! Error types for OpenPGP operations.

use thiserror::Error;

/// OpenPGP operation errors.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Key generation failed.
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Armored key could not be parsed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A private key was expected but the certificate has no secret material.
    #[error("Key {0} has no secret key material")]
    NotAPrivateKey(String),

    /// The recipient certificate has no usable encryption-capable key.
    #[error("Key {0} has no valid encryption key")]
    NoEncryptionKey(String),

    /// Encryption failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Serialized output was not valid armor text.
    #[error("Armor encoding failed: {0}")]
    Armor(String),

    /// Unknown key algorithm name.
    #[error("Unsupported key algorithm: {0}")]
    InvalidAlgorithm(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for OpenPGP operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

impl From<CryptoError> for pgpmail_core::Error {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::Io(io) => pgpmail_core::Error::Io(io),
            CryptoError::InvalidAlgorithm(_) => pgpmail_core::Error::Config(e.to_string()),
            other => pgpmail_core::Error::Crypto(other.to_string()),
        }
    }
}
