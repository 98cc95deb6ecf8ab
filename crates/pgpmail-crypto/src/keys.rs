//! OpenPGP key pair generation, armoring, and parsing.
//!
//! A [`KeyPair`] is a full certificate including unencrypted secret key
//! material; a [`PublicKey`] is the same certificate stripped of secrets.
//! Both travel through the rest of the system as ASCII-armored text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use sequoia_openpgp as openpgp;

use openpgp::cert::{Cert, CertBuilder, CipherSuite};
use openpgp::packet::UserID;
use openpgp::parse::Parse;
use openpgp::serialize::SerializeInto;
use tracing::{debug, info};

use pgpmail_core::{ArmoredKeyPair, UserIdentity};

use crate::error::{CryptoError, CryptoResult};

/// Asymmetric algorithm used for newly generated keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    /// 2048-bit RSA.
    #[default]
    Rsa2048,
    Rsa3072,
    Rsa4096,
    /// Ed25519 signing with Curve25519 encryption. Much faster to generate.
    Cv25519,
}

impl KeyAlgorithm {
    fn cipher_suite(self) -> CipherSuite {
        match self {
            Self::Rsa2048 => CipherSuite::RSA2k,
            Self::Rsa3072 => CipherSuite::RSA3k,
            Self::Rsa4096 => CipherSuite::RSA4k,
            Self::Cv25519 => CipherSuite::Cv25519,
        }
    }
}

impl FromStr for KeyAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rsa" | "rsa2048" | "rsa2k" => Ok(Self::Rsa2048),
            "rsa3072" | "rsa3k" => Ok(Self::Rsa3072),
            "rsa4096" | "rsa4k" => Ok(Self::Rsa4096),
            "cv25519" | "25519" => Ok(Self::Cv25519),
            _ => Err(CryptoError::InvalidAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa2048 => write!(f, "rsa2048"),
            Self::Rsa3072 => write!(f, "rsa3072"),
            Self::Rsa4096 => write!(f, "rsa4096"),
            Self::Cv25519 => write!(f, "cv25519"),
        }
    }
}

/// A certificate with unencrypted secret key material.
#[derive(Clone)]
pub struct KeyPair {
    cert: Cert,
}

impl KeyPair {
    /// Generate a new key pair bound to `identity`.
    ///
    /// The certificate carries a signing subkey and a transport encryption
    /// subkey. Secrets are stored without a passphrase.
    pub fn generate(identity: &UserIdentity, algorithm: KeyAlgorithm) -> CryptoResult<Self> {
        let user_id = identity.user_id();
        debug!(
            subsystem = "crypto",
            op = "generate",
            email = %identity.email,
            key_algorithm = %algorithm,
            "Generating key pair"
        );

        let (cert, _revocation) = CertBuilder::new()
            .set_cipher_suite(algorithm.cipher_suite())
            .add_userid(UserID::from(user_id))
            .add_signing_subkey()
            .add_transport_encryption_subkey()
            .generate()
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;

        info!(
            email = %identity.email,
            fingerprint = %cert.fingerprint().to_hex(),
            key_algorithm = %algorithm,
            "Key pair generated"
        );

        Ok(Self { cert })
    }

    /// Parse an armored private key.
    pub fn from_armored_private(armored: &str) -> CryptoResult<Self> {
        let cert = Cert::from_bytes(armored.as_bytes())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        if !cert.is_tsk() {
            return Err(CryptoError::NotAPrivateKey(cert.fingerprint().to_hex()));
        }

        Ok(Self { cert })
    }

    /// Armored private and public halves, ready for storage.
    pub fn to_armored(&self) -> CryptoResult<ArmoredKeyPair> {
        let private_key = self
            .cert
            .as_tsk()
            .armored()
            .to_vec()
            .map_err(|e| CryptoError::Armor(e.to_string()))?;
        let public_key = self
            .cert
            .armored()
            .to_vec()
            .map_err(|e| CryptoError::Armor(e.to_string()))?;

        Ok(ArmoredKeyPair {
            private_key: into_armor_text(private_key)?,
            public_key: into_armor_text(public_key)?,
        })
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            cert: self.cert.clone().strip_secret_key_material(),
        }
    }

    /// Upper-case hex fingerprint of the primary key.
    pub fn fingerprint(&self) -> String {
        self.cert.fingerprint().to_hex()
    }

    /// User ids bound to the certificate.
    pub fn user_ids(&self) -> Vec<String> {
        user_ids(&self.cert)
    }

    pub(crate) fn cert(&self) -> &Cert {
        &self.cert
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("fingerprint", &self.fingerprint())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// A certificate without secret key material.
#[derive(Clone)]
pub struct PublicKey {
    cert: Cert,
}

impl PublicKey {
    /// Parse an armored public key.
    ///
    /// A private key is accepted too; its secrets are dropped.
    pub fn from_armored(armored: &str) -> CryptoResult<Self> {
        let cert = Cert::from_bytes(armored.as_bytes())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        Ok(Self {
            cert: cert.strip_secret_key_material(),
        })
    }

    /// Upper-case hex fingerprint of the primary key.
    pub fn fingerprint(&self) -> String {
        self.cert.fingerprint().to_hex()
    }

    /// User ids bound to the certificate.
    pub fn user_ids(&self) -> Vec<String> {
        user_ids(&self.cert)
    }

    /// Armored form of the certificate.
    pub fn to_armored(&self) -> CryptoResult<String> {
        let bytes = self
            .cert
            .armored()
            .to_vec()
            .map_err(|e| CryptoError::Armor(e.to_string()))?;
        into_armor_text(bytes)
    }

    pub(crate) fn cert(&self) -> &Cert {
        &self.cert
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.fingerprint())
    }
}

fn user_ids(cert: &Cert) -> Vec<String> {
    cert.userids()
        .map(|ua| String::from_utf8_lossy(ua.userid().value()).into_owned())
        .collect()
}

fn into_armor_text(bytes: Vec<u8>) -> CryptoResult<String> {
    String::from_utf8(bytes).map_err(|e| CryptoError::Armor(e.to_string()))
}
