//! Pick a stored message and trial-decrypt it with every known private key.
//!
//! ## Attempt Order
//!
//! Private keys are tried in the order the key repository lists them. The
//! first key that opens the message wins and no further keys are tried.
//! Every attempt is recorded with its typed outcome so the caller can
//! summarise why the other keys failed.

use std::collections::BTreeMap;

use pgpmail_core::{
    Envelope, Error, KeyRepository, MessageId, MessageRepository, Result,
};
use pgpmail_crypto::{try_decrypt, DecryptAttempt};
use tracing::{debug, info, instrument};

/// Outcome of one key against one message, without the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Decrypted,
    WrongKey,
    MalformedInput(String),
    Failed(String),
}

impl AttemptOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decrypted => "decrypted",
            Self::WrongKey => "wrong_key",
            Self::MalformedInput(_) => "malformed_input",
            Self::Failed(_) => "failed",
        }
    }

    /// Failure detail, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::MalformedInput(reason) | Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<&DecryptAttempt> for AttemptOutcome {
    fn from(attempt: &DecryptAttempt) -> Self {
        match attempt {
            DecryptAttempt::Decrypted(_) => Self::Decrypted,
            DecryptAttempt::WrongKey => Self::WrongKey,
            DecryptAttempt::MalformedInput(reason) => Self::MalformedInput(reason.clone()),
            DecryptAttempt::Failed(reason) => Self::Failed(reason.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttempt {
    /// Name of the private key, e.g. `bob@example.com_private.asc`.
    pub key_label: String,
    pub outcome: AttemptOutcome,
}

/// A successfully decrypted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedMessage {
    pub key_label: String,
    /// The decrypted text exactly as recovered.
    pub plaintext: String,
    pub envelope: Envelope,
}

/// Everything that happened while decrypting one message.
#[derive(Debug, Clone)]
pub struct DecryptReport {
    pub message_id: MessageId,
    pub attempts: Vec<KeyAttempt>,
    pub opened: Option<OpenedMessage>,
}

impl DecryptReport {
    pub fn is_opened(&self) -> bool {
        self.opened.is_some()
    }

    /// Count of failed attempts per outcome kind.
    pub fn failure_summary(&self) -> BTreeMap<&'static str, usize> {
        let mut summary = BTreeMap::new();
        for attempt in &self.attempts {
            if attempt.outcome != AttemptOutcome::Decrypted {
                *summary.entry(attempt.outcome.kind()).or_insert(0) += 1;
            }
        }
        summary
    }

    /// The opened message, or [`Error::DecryptionFailed`] if no key worked.
    pub fn into_opened(self) -> Result<OpenedMessage> {
        let attempts = self.attempts.len();
        self.opened.ok_or(Error::DecryptionFailed { attempts })
    }
}

/// Parse a 1-based menu choice against the current listing.
///
/// Anything that is not a number in `1..=listing.len()` is
/// [`Error::InvalidSelection`].
pub fn parse_selection(input: &str, listing: &[MessageId]) -> Result<MessageId> {
    let invalid = || Error::InvalidSelection {
        input: input.trim().to_string(),
        count: listing.len(),
    };

    let choice: usize = input.trim().parse().map_err(|_| invalid())?;
    choice
        .checked_sub(1)
        .and_then(|index| listing.get(index))
        .copied()
        .ok_or_else(invalid)
}

pub struct DecryptService<K, M> {
    keys: K,
    messages: M,
}

impl<K: KeyRepository, M: MessageRepository> DecryptService<K, M> {
    pub fn new(keys: K, messages: M) -> Self {
        Self { keys, messages }
    }

    /// Stored messages in display order. Empty when there are none.
    pub fn list_messages(&self) -> Result<Vec<MessageId>> {
        self.messages.list()
    }

    /// Resolve a menu choice against the current listing.
    ///
    /// Fails with [`Error::NoMessages`] when the store is empty.
    pub fn select(&self, input: &str) -> Result<MessageId> {
        let listing = self.list_messages()?;
        if listing.is_empty() {
            return Err(Error::NoMessages);
        }
        parse_selection(input, &listing)
    }

    /// Try every private key against message `id` until one opens it.
    #[instrument(skip_all, fields(
        subsystem = "cli",
        component = "decrypt",
        op = "decrypt",
        message_id = %id,
    ))]
    pub fn decrypt(&self, id: MessageId) -> Result<DecryptReport> {
        let armored = self
            .messages
            .get(id)?
            .ok_or_else(|| Error::NotFound(format!("message {}", id)))?;

        let private_keys = self.keys.list_private_keys()?;
        if private_keys.is_empty() {
            return Err(Error::NoPrivateKeys);
        }

        let mut attempts = Vec::with_capacity(private_keys.len());
        for entry in private_keys {
            let attempt = try_decrypt(armored.as_bytes(), &entry.armored);
            let outcome = AttemptOutcome::from(&attempt);
            debug!(
                key_label = %entry.label,
                attempt_outcome = outcome.kind(),
                reason = outcome.reason().unwrap_or(""),
                "Decrypt attempt"
            );
            attempts.push(KeyAttempt {
                key_label: entry.label.clone(),
                outcome,
            });

            if let DecryptAttempt::Decrypted(plaintext) = attempt {
                let plaintext = String::from_utf8_lossy(&plaintext).into_owned();
                info!(key_label = %entry.label, attempt_count = attempts.len(), "Message decrypted");
                return Ok(DecryptReport {
                    message_id: id,
                    attempts,
                    opened: Some(OpenedMessage {
                        key_label: entry.label,
                        envelope: Envelope::parse(&plaintext),
                        plaintext,
                    }),
                });
            }
        }

        info!(
            attempt_count = attempts.len(),
            "No private key could decrypt the message"
        );

        Ok(DecryptReport {
            message_id: id,
            attempts,
            opened: None,
        })
    }
}
