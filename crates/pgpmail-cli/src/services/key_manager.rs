//! Get-or-create key pairs per email address.

use std::fmt;

use pgpmail_core::{EmailAddress, KeyRepository, Result, UserIdentity};
use pgpmail_crypto::{KeyAlgorithm, KeyPair, PublicKey};
use tracing::{debug, info, instrument};

/// Whether [`KeyManager::ensure_keys`] had to create the key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Generated,
    Existing,
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated => write!(f, "generated"),
            Self::Existing => write!(f, "existing"),
        }
    }
}

/// Result of ensuring an address has keys.
#[derive(Debug, Clone)]
pub struct EnsuredKeys {
    pub email: EmailAddress,
    pub status: KeyStatus,
    pub public_key: PublicKey,
    pub fingerprint: String,
}

/// Creates a key pair the first time an address is seen, then reuses it.
#[derive(Debug, Clone)]
pub struct KeyManager<K> {
    keys: K,
    algorithm: KeyAlgorithm,
}

impl<K: KeyRepository> KeyManager<K> {
    pub fn new(keys: K, algorithm: KeyAlgorithm) -> Self {
        Self { keys, algorithm }
    }

    pub fn repository(&self) -> &K {
        &self.keys
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Return the stored key pair for `email`, generating and storing one if
    /// the address has none yet.
    ///
    /// An existing pair is never rewritten.
    #[instrument(skip_all, fields(
        subsystem = "cli",
        component = "key_manager",
        op = "ensure_keys",
        email = %email,
    ))]
    pub fn ensure_keys(&self, email: &EmailAddress) -> Result<EnsuredKeys> {
        if let Some(stored) = self.keys.get(email)? {
            let public_key = PublicKey::from_armored(&stored.public_key)?;
            let fingerprint = public_key.fingerprint();
            debug!(%fingerprint, "Existing key pair found");
            return Ok(EnsuredKeys {
                email: email.clone(),
                status: KeyStatus::Existing,
                public_key,
                fingerprint,
            });
        }

        let keypair = KeyPair::generate(&UserIdentity::for_email(email), self.algorithm)?;
        self.keys.put(email, &keypair.to_armored()?)?;

        let fingerprint = keypair.fingerprint();
        info!(%fingerprint, key_algorithm = %self.algorithm, "Key pair created");

        Ok(EnsuredKeys {
            email: email.clone(),
            status: KeyStatus::Generated,
            public_key: keypair.public_key(),
            fingerprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgpmail_store::InMemoryKeyRepository;

    #[test]
    fn test_generates_once_then_reuses() {
        let manager = KeyManager::new(InMemoryKeyRepository::new(), KeyAlgorithm::Cv25519);
        let email = EmailAddress::new("alice@example.com").unwrap();

        let first = manager.ensure_keys(&email).unwrap();
        let second = manager.ensure_keys(&email).unwrap();

        assert_eq!(first.status, KeyStatus::Generated);
        assert_eq!(second.status, KeyStatus::Existing);
        assert_eq!(first.fingerprint, second.fingerprint);
        assert_eq!(manager.repository().len().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_stored_key_is_crypto_error() {
        let repo = InMemoryKeyRepository::new();
        let email = EmailAddress::new("broken@example.com").unwrap();
        repo.put(
            &email,
            &pgpmail_core::ArmoredKeyPair {
                private_key: "garbage".into(),
                public_key: "garbage".into(),
            },
        )
        .unwrap();

        let manager = KeyManager::new(repo, KeyAlgorithm::Cv25519);
        let err = manager.ensure_keys(&email).unwrap_err();
        assert!(matches!(err, pgpmail_core::Error::Crypto(_)));
    }
}
