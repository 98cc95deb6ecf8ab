//! Message encryption and trial decryption.
//!
//! # Encryption Flow
//!
//! 1. Select every valid, non-revoked transport encryption key of the recipient
//! 2. Wrap a fresh session key for each of them (PKESK packets)
//! 3. Encrypt a literal data packet with the session key
//! 4. Armor the whole message
//!
//! # Decryption Flow
//!
//! Trial decryption never panics and never returns an error. Every outcome
//! is a [`DecryptAttempt`] so callers can tell a wrong key from a broken
//! message:
//!
//! 1. Parse the ciphertext and collect the key ids its session keys are
//!    addressed to ([`DecryptAttempt::MalformedInput`] if that fails)
//! 2. Parse the private key and collect its secret encryption keys
//!    ([`DecryptAttempt::Failed`] if there are none)
//! 3. If none of them is addressed by the message, stop with
//!    [`DecryptAttempt::WrongKey`]
//! 4. Unlock the addressed keys, trying the empty passphrase on encrypted
//!    secrets ([`DecryptAttempt::Failed`] if none unlocks)
//! 5. Decrypt the session key and stream out the literal data

use std::fmt;
use std::io::{Read, Write};

use sequoia_openpgp as openpgp;

use openpgp::crypto::{KeyPair as SecretKeyPair, Password, SessionKey};
use openpgp::packet::key::{SecretParts, UnspecifiedRole};
use openpgp::packet::{Key, PKESK, SKESK};
use openpgp::parse::stream::{
    DecryptionHelper, DecryptorBuilder, MessageStructure, VerificationHelper,
};
use openpgp::parse::Parse;
use openpgp::policy::StandardPolicy;
use openpgp::serialize::stream::{Armorer, Encryptor, LiteralWriter, Message};
use openpgp::types::SymmetricAlgorithm;
use openpgp::{Cert, Fingerprint, KeyHandle, KeyID, Packet, PacketPile};
use tracing::{debug, trace};

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{KeyPair, PublicKey};

/// Encrypt `plaintext` to the recipient's public key.
///
/// Returns an ASCII-armored OpenPGP message.
pub fn encrypt_message(plaintext: &[u8], recipient: &PublicKey) -> CryptoResult<String> {
    let policy = StandardPolicy::new();

    let recipients: Vec<_> = recipient
        .cert()
        .keys()
        .with_policy(&policy, None)
        .supported()
        .alive()
        .revoked(false)
        .for_transport_encryption()
        .collect();

    if recipients.is_empty() {
        return Err(CryptoError::NoEncryptionKey(recipient.fingerprint()));
    }

    let mut sink = Vec::new();
    let message = Message::new(&mut sink);
    let message = Armorer::new(message)
        .build()
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    let message = Encryptor::for_recipients(message, recipients)
        .build()
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    let mut message = LiteralWriter::new(message)
        .build()
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    message.write_all(plaintext)?;
    message
        .finalize()
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    debug!(
        subsystem = "crypto",
        op = "encrypt",
        fingerprint = %recipient.fingerprint(),
        size_bytes = plaintext.len(),
        "Message encrypted"
    );

    String::from_utf8(sink).map_err(|e| CryptoError::Armor(e.to_string()))
}

/// Outcome of decrypting one message with one private key.
#[derive(Clone, PartialEq, Eq)]
pub enum DecryptAttempt {
    /// The key opened the message.
    Decrypted(Vec<u8>),
    /// The message is not addressed to any encryption key of this private key.
    WrongKey,
    /// The ciphertext could not be parsed as an encrypted OpenPGP message.
    MalformedInput(String),
    /// Anything else: an unreadable or locked private key, or a failure
    /// after a matching key was found.
    Failed(String),
}

impl DecryptAttempt {
    /// Stable snake_case name of the outcome, used in logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decrypted(_) => "decrypted",
            Self::WrongKey => "wrong_key",
            Self::MalformedInput(_) => "malformed_input",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Decrypted(_))
    }
}

impl fmt::Debug for DecryptAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decrypted(plaintext) => write!(f, "Decrypted({} bytes)", plaintext.len()),
            Self::WrongKey => write!(f, "WrongKey"),
            Self::MalformedInput(reason) => write!(f, "MalformedInput({})", reason),
            Self::Failed(reason) => write!(f, "Failed({})", reason),
        }
    }
}

/// Try to decrypt an armored or binary message with one armored private key.
pub fn try_decrypt(ciphertext: &[u8], private_key_armored: &str) -> DecryptAttempt {
    let addressed_to = match session_key_recipients(ciphertext) {
        Ok(ids) => ids,
        Err(reason) => return DecryptAttempt::MalformedInput(reason),
    };

    let keypair = match KeyPair::from_armored_private(private_key_armored) {
        Ok(keypair) => keypair,
        Err(e) => return DecryptAttempt::Failed(e.to_string()),
    };

    let policy = StandardPolicy::new();
    let secrets = secret_encryption_keys(keypair.cert(), &policy);
    if secrets.is_empty() {
        return DecryptAttempt::Failed("private key has no usable encryption key".to_string());
    }

    let addressed: Vec<SecretKey> = secrets
        .into_iter()
        .filter(|key| {
            let id = key.keyid();
            addressed_to
                .iter()
                .any(|recipient| recipient.is_wildcard() || *recipient == id)
        })
        .collect();

    if addressed.is_empty() {
        trace!(fingerprint = %keypair.fingerprint(), "No session key addressed to this key");
        return DecryptAttempt::WrongKey;
    }

    let candidates = match unlock(addressed) {
        Ok(pairs) => pairs,
        Err(reason) => return DecryptAttempt::Failed(reason),
    };

    let helper = Helper {
        fingerprint: keypair.cert().fingerprint(),
        keys: candidates,
    };

    let mut decryptor = match DecryptorBuilder::from_bytes(ciphertext)
        .and_then(|builder| builder.with_policy(&policy, None, helper))
    {
        Ok(decryptor) => decryptor,
        Err(e) => return DecryptAttempt::Failed(e.to_string()),
    };

    let mut plaintext = Vec::new();
    match decryptor.read_to_end(&mut plaintext) {
        Ok(_) => DecryptAttempt::Decrypted(plaintext),
        Err(e) => DecryptAttempt::Failed(e.to_string()),
    }
}

/// Key ids the message's public-key encrypted session keys are addressed to.
fn session_key_recipients(ciphertext: &[u8]) -> Result<Vec<KeyID>, String> {
    let pile = PacketPile::from_bytes(ciphertext).map_err(|e| e.to_string())?;

    let recipients: Vec<KeyID> = pile
        .descendants()
        .filter_map(|packet| match packet {
            Packet::PKESK(pkesk) => Some(pkesk.recipient().clone()),
            _ => None,
        })
        .collect();

    if recipients.is_empty() {
        return Err("message has no public-key encrypted session keys".to_string());
    }

    Ok(recipients)
}

type SecretKey = Key<SecretParts, UnspecifiedRole>;

/// Valid encryption-capable keys of `cert` that carry secret material,
/// locked or not.
fn secret_encryption_keys(cert: &Cert, policy: &StandardPolicy) -> Vec<SecretKey> {
    cert.keys()
        .secret()
        .with_policy(policy, None)
        .supported()
        .for_transport_encryption()
        .for_storage_encryption()
        .map(|ka| ka.key().clone())
        .collect()
}

/// Turn secret keys into usable key pairs. Encrypted secrets are unlocked
/// with the empty passphrase; keys protected by a real one are skipped.
fn unlock(keys: Vec<SecretKey>) -> Result<Vec<SecretKeyPair>, String> {
    let empty = Password::from("");
    let mut pairs = Vec::new();

    for key in keys {
        let key = if key.secret().is_encrypted() {
            match key.decrypt_secret(&empty) {
                Ok(key) => key,
                Err(_) => continue,
            }
        } else {
            key
        };
        pairs.push(key.into_keypair().map_err(|e| e.to_string())?);
    }

    if pairs.is_empty() {
        return Err("private key is passphrase protected".to_string());
    }

    Ok(pairs)
}

/// Feeds the pre-selected secret keys to the streaming decryptor.
struct Helper {
    fingerprint: Fingerprint,
    keys: Vec<SecretKeyPair>,
}

impl VerificationHelper for Helper {
    fn get_certs(&mut self, _ids: &[KeyHandle]) -> openpgp::Result<Vec<Cert>> {
        Ok(Vec::new())
    }

    fn check(&mut self, _structure: MessageStructure) -> openpgp::Result<()> {
        // Messages are not signed.
        Ok(())
    }
}

impl DecryptionHelper for Helper {
    fn decrypt<D>(
        &mut self,
        pkesks: &[PKESK],
        _skesks: &[SKESK],
        sym_algo: Option<SymmetricAlgorithm>,
        mut decrypt: D,
    ) -> openpgp::Result<Option<Fingerprint>>
    where
        D: FnMut(SymmetricAlgorithm, &SessionKey) -> bool,
    {
        for pkesk in pkesks {
            for pair in self.keys.iter_mut() {
                let recipient = pkesk.recipient();
                if !recipient.is_wildcard() && *recipient != pair.public().keyid() {
                    continue;
                }

                let opened = pkesk
                    .decrypt(pair, sym_algo)
                    .map(|(algo, session_key)| decrypt(algo, &session_key))
                    .unwrap_or(false);
                if opened {
                    return Ok(Some(self.fingerprint.clone()));
                }
            }
        }

        Ok(None)
    }
}
