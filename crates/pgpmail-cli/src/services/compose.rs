//! Compose, encrypt and store a message.

use pgpmail_core::{EmailAddress, Envelope, KeyRepository, MessageId, MessageRepository, Result};
use pgpmail_crypto::{encrypt_message, KeyAlgorithm};
use tracing::{info, instrument};

use super::key_manager::{KeyManager, KeyStatus};

/// A message to send. Addresses are validated on construction.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub sender: EmailAddress,
    pub recipient: EmailAddress,
    pub body: String,
}

impl ComposeRequest {
    /// Build a request from raw user input.
    pub fn new(sender: &str, recipient: &str, body: impl Into<String>) -> Result<Self> {
        Ok(Self {
            sender: EmailAddress::new(sender)?,
            recipient: EmailAddress::new(recipient)?,
            body: body.into(),
        })
    }
}

/// What [`ComposeService::compose`] did.
#[derive(Debug, Clone)]
pub struct ComposeOutcome {
    pub message_id: MessageId,
    /// The stored armored ciphertext.
    pub armored: String,
    pub sender_status: KeyStatus,
    pub recipient_status: KeyStatus,
}

pub struct ComposeService<K, M> {
    keys: KeyManager<K>,
    messages: M,
}

impl<K: KeyRepository, M: MessageRepository> ComposeService<K, M> {
    pub fn new(keys: K, messages: M, algorithm: KeyAlgorithm) -> Self {
        Self {
            keys: KeyManager::new(keys, algorithm),
            messages,
        }
    }

    pub fn key_manager(&self) -> &KeyManager<K> {
        &self.keys
    }

    /// Ensure both parties have keys, encrypt the envelope to the recipient
    /// and store it under the next free message number.
    ///
    /// The sender's key is only created, never used: messages are not signed
    /// and the sender cannot read them back unless they are also the recipient.
    #[instrument(skip_all, fields(
        subsystem = "cli",
        component = "compose",
        op = "compose",
        sender = %request.sender,
        recipient = %request.recipient,
    ))]
    pub fn compose(&self, request: ComposeRequest) -> Result<ComposeOutcome> {
        let sender = self.keys.ensure_keys(&request.sender)?;
        let recipient = self.keys.ensure_keys(&request.recipient)?;

        let envelope = Envelope::new(&request.sender, &request.recipient, request.body);
        let armored = encrypt_message(envelope.render().as_bytes(), &recipient.public_key)?;

        let message_id = self.messages.next_id()?;
        self.messages.put(message_id, &armored)?;

        info!(
            message_id = %message_id,
            fingerprint = %recipient.fingerprint,
            "Message encrypted and stored"
        );

        Ok(ComposeOutcome {
            message_id,
            armored,
            sender_status: sender.status,
            recipient_status: recipient.status,
        })
    }
}
