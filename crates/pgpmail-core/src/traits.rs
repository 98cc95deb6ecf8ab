//! Storage traits for pgpmail.
//!
//! These traits define the interfaces that concrete stores must satisfy,
//! so the workflows never touch the filesystem directly and can be tested
//! against in-memory fakes.

use crate::error::Result;
use crate::models::{ArmoredKeyPair, EmailAddress, MessageId, PrivateKeyEntry};

// =============================================================================
// KEY REPOSITORY
// =============================================================================

/// Storage of one armored key pair per email address.
pub trait KeyRepository: Send + Sync {
    /// Fetch both halves of the key pair for `email`.
    ///
    /// Returns `Ok(None)` unless both halves are stored.
    fn get(&self, email: &EmailAddress) -> Result<Option<ArmoredKeyPair>>;

    /// Store a key pair, replacing whatever was stored for `email`.
    fn put(&self, email: &EmailAddress, keys: &ArmoredKeyPair) -> Result<()>;

    /// Whether both the private and the public half exist for `email`.
    fn exists(&self, email: &EmailAddress) -> Result<bool>;

    /// Every address with at least a user entry in the store.
    fn list(&self) -> Result<Vec<EmailAddress>>;

    /// Every private key in the store, in a stable order.
    fn list_private_keys(&self) -> Result<Vec<PrivateKeyEntry>>;
}

// =============================================================================
// MESSAGE REPOSITORY
// =============================================================================

/// Storage of numbered, immutable ciphertext blobs.
pub trait MessageRepository: Send + Sync {
    /// The first unused index, probing upward from 1.
    fn next_id(&self) -> Result<MessageId>;

    /// Store a message. Fails if `id` is already taken.
    fn put(&self, id: MessageId, armored: &str) -> Result<()>;

    /// Fetch a stored message.
    fn get(&self, id: MessageId) -> Result<Option<String>>;

    /// All stored message ids in ascending order.
    fn list(&self) -> Result<Vec<MessageId>>;
}

impl<T: KeyRepository + ?Sized> KeyRepository for std::sync::Arc<T> {
    fn get(&self, email: &EmailAddress) -> Result<Option<ArmoredKeyPair>> {
        (**self).get(email)
    }

    fn put(&self, email: &EmailAddress, keys: &ArmoredKeyPair) -> Result<()> {
        (**self).put(email, keys)
    }

    fn exists(&self, email: &EmailAddress) -> Result<bool> {
        (**self).exists(email)
    }

    fn list(&self) -> Result<Vec<EmailAddress>> {
        (**self).list()
    }

    fn list_private_keys(&self) -> Result<Vec<PrivateKeyEntry>> {
        (**self).list_private_keys()
    }
}

impl<T: MessageRepository + ?Sized> MessageRepository for std::sync::Arc<T> {
    fn next_id(&self) -> Result<MessageId> {
        (**self).next_id()
    }

    fn put(&self, id: MessageId, armored: &str) -> Result<()> {
        (**self).put(id, armored)
    }

    fn get(&self, id: MessageId) -> Result<Option<String>> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<MessageId>> {
        (**self).list()
    }
}
