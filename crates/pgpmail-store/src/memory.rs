//! In-memory key and message stores.
//!
//! Same semantics as the filesystem stores, minus persistence. Useful for
//! tests and for embedding the workflows without touching disk.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use pgpmail_core::defaults::PRIVATE_KEY_SUFFIX;
use pgpmail_core::{
    ArmoredKeyPair, EmailAddress, Error, KeyRepository, MessageId, MessageRepository,
    PrivateKeyEntry, Result,
};

fn poisoned<T>(_: PoisonError<T>) -> Error {
    Error::Storage("store lock poisoned".to_string())
}

/// Key store backed by an ordered map.
#[derive(Debug, Default)]
pub struct InMemoryKeyRepository {
    keys: RwLock<BTreeMap<EmailAddress, ArmoredKeyPair>>,
}

impl InMemoryKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored key pairs.
    pub fn len(&self) -> Result<usize> {
        Ok(self.keys.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl KeyRepository for InMemoryKeyRepository {
    fn get(&self, email: &EmailAddress) -> Result<Option<ArmoredKeyPair>> {
        Ok(self.keys.read().map_err(poisoned)?.get(email).cloned())
    }

    fn put(&self, email: &EmailAddress, keys: &ArmoredKeyPair) -> Result<()> {
        self.keys
            .write()
            .map_err(poisoned)?
            .insert(email.clone(), keys.clone());
        Ok(())
    }

    fn exists(&self, email: &EmailAddress) -> Result<bool> {
        Ok(self.keys.read().map_err(poisoned)?.contains_key(email))
    }

    fn list(&self) -> Result<Vec<EmailAddress>> {
        Ok(self.keys.read().map_err(poisoned)?.keys().cloned().collect())
    }

    fn list_private_keys(&self) -> Result<Vec<PrivateKeyEntry>> {
        Ok(self
            .keys
            .read()
            .map_err(poisoned)?
            .iter()
            .map(|(email, pair)| PrivateKeyEntry {
                label: format!("{}{}", email, PRIVATE_KEY_SUFFIX),
                armored: pair.private_key.clone(),
            })
            .collect())
    }
}

/// Message store backed by an ordered map.
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    messages: RwLock<BTreeMap<MessageId, String>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageRepository for InMemoryMessageRepository {
    fn next_id(&self) -> Result<MessageId> {
        let messages = self.messages.read().map_err(poisoned)?;
        let mut id = MessageId::FIRST;
        while messages.contains_key(&id) {
            id = id.next();
        }
        Ok(id)
    }

    fn put(&self, id: MessageId, armored: &str) -> Result<()> {
        let mut messages = self.messages.write().map_err(poisoned)?;
        if messages.contains_key(&id) {
            return Err(Error::Storage(format!("{} already exists", id)));
        }
        messages.insert(id, armored.to_string());
        Ok(())
    }

    fn get(&self, id: MessageId) -> Result<Option<String>> {
        Ok(self.messages.read().map_err(poisoned)?.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<MessageId>> {
        Ok(self.messages.read().map_err(poisoned)?.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_key_labels_match_file_names() {
        let repo = InMemoryKeyRepository::new();
        let email = EmailAddress::new("zoe@example.com").unwrap();
        repo.put(
            &email,
            &ArmoredKeyPair {
                private_key: "priv".into(),
                public_key: "pub".into(),
            },
        )
        .unwrap();

        let keys = repo.list_private_keys().unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].label, "zoe@example.com_private.asc");
        assert_eq!(keys[0].armored, "priv");
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[test]
    fn test_next_id_fills_first_gap() {
        let repo = InMemoryMessageRepository::new();
        repo.put(MessageId::new(1).unwrap(), "a").unwrap();
        repo.put(MessageId::new(3).unwrap(), "c").unwrap();

        assert_eq!(repo.next_id().unwrap().index(), 2);
    }

    #[test]
    fn test_poisoned_lock_is_storage_error() {
        let repo = std::sync::Arc::new(InMemoryKeyRepository::new());
        let poisoner = repo.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.keys.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(repo.len(), Err(Error::Storage(_))));
        assert!(matches!(repo.is_empty(), Err(Error::Storage(_))));
        assert!(matches!(repo.list(), Err(Error::Storage(_))));
    }
}
