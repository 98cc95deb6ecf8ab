//! Domain types shared by every pgpmail crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::defaults::{MESSAGE_EXTENSION, MESSAGE_INDEX_WIDTH, MESSAGE_PREFIX};
use crate::error::{Error, Result};

// =============================================================================
// USERS
// =============================================================================

/// An email address identifying a user.
///
/// Only surrounding whitespace is stripped. The address is used verbatim as
/// a directory name, so empty input and path separators are rejected;
/// otherwise no syntax check is made.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and normalise an address typed by the user.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput(
                "email address cannot be empty".to_string(),
            ));
        }
        if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
            return Err(Error::InvalidInput(format!(
                "email address '{}' cannot be used as a directory name",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text before the first `@`, or the whole address if there is none.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }

    /// Display name derived from the local part: first letter upper case,
    /// the rest lower case.
    pub fn display_name(&self) -> String {
        let mut chars = self.local_part().chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EmailAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// The identity a key pair is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub email: EmailAddress,
    pub name: String,
}

impl UserIdentity {
    /// Build the identity for an address, deriving the name from its local part.
    pub fn for_email(email: &EmailAddress) -> Self {
        Self {
            name: email.display_name(),
            email: email.clone(),
        }
    }

    /// OpenPGP user id string, `Name <email>`.
    pub fn user_id(&self) -> String {
        if self.name.is_empty() {
            format!("<{}>", self.email)
        } else {
            format!("{} <{}>", self.name, self.email)
        }
    }
}

// =============================================================================
// KEYS
// =============================================================================

/// Armored private and public halves of a user's key pair.
///
/// Both are opaque text to the storage layer.
#[derive(Clone, PartialEq, Eq)]
pub struct ArmoredKeyPair {
    pub private_key: String,
    pub public_key: String,
}

impl fmt::Debug for ArmoredKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmoredKeyPair")
            .field("private_key", &"[REDACTED]")
            .field("public_key_len", &self.public_key.len())
            .finish()
    }
}

/// One private key found while scanning the key store.
#[derive(Clone)]
pub struct PrivateKeyEntry {
    /// File name of the key (`alice@example.com_private.asc`).
    pub label: String,
    pub armored: String,
}

impl fmt::Debug for PrivateKeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyEntry")
            .field("label", &self.label)
            .field("armored", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

/// 1-based index of a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(u32);

impl MessageId {
    /// The first index handed out in an empty store.
    pub const FIRST: MessageId = MessageId(1);

    /// Create an id; index 0 is not a valid message.
    pub fn new(index: u32) -> Result<Self> {
        if index == 0 {
            return Err(Error::InvalidInput(
                "message index starts at 1".to_string(),
            ));
        }
        Ok(Self(index))
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    /// The id after this one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Storage file name, e.g. `message_001.asc`.
    pub fn file_name(&self) -> String {
        format!(
            "{}{:0width$}.{}",
            MESSAGE_PREFIX,
            self.0,
            MESSAGE_EXTENSION,
            width = MESSAGE_INDEX_WIDTH
        )
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

impl FromStr for MessageId {
    type Err = Error;

    /// Parse a storage file name such as `message_042.asc`.
    ///
    /// Only the canonical spelling is accepted: `message_1.asc` and
    /// `message_0042.asc` are not message files, since [`MessageId::file_name`]
    /// would point at a different file.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput(format!("'{}' is not a message file name", s));

        let digits = s
            .strip_prefix(MESSAGE_PREFIX)
            .and_then(|rest| rest.strip_suffix(MESSAGE_EXTENSION))
            .and_then(|rest| rest.strip_suffix('.'))
            .ok_or_else(invalid)?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let index: u32 = digits.parse().map_err(|_| invalid())?;
        let id = Self::new(index).map_err(|_| invalid())?;
        if id.file_name() != s {
            return Err(invalid());
        }
        Ok(id)
    }
}

/// The plaintext structure encrypted as one blob: `From:`/`To:` headers,
/// a blank line, then the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub from: String,
    pub to: String,
    pub body: String,
}

impl Envelope {
    pub fn new(from: &EmailAddress, to: &EmailAddress, body: impl Into<String>) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            body: body.into(),
        }
    }

    /// Render to the exact text that gets encrypted.
    pub fn render(&self) -> String {
        format!("From: {}\nTo: {}\n\n{}", self.from, self.to, self.body)
    }

    /// Recover the parts of a rendered envelope.
    ///
    /// Text that does not start with a header block is returned whole as the
    /// body with empty `from`/`to`.
    pub fn parse(text: &str) -> Self {
        let Some((headers, body)) = text.split_once("\n\n") else {
            return Self::headerless(text);
        };

        let mut from = None;
        let mut to = None;
        for line in headers.lines() {
            if let Some(value) = line.strip_prefix("From:") {
                from = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("To:") {
                to = Some(value.trim().to_string());
            } else {
                return Self::headerless(text);
            }
        }

        match (from, to) {
            (None, None) => Self::headerless(text),
            (from, to) => Self {
                from: from.unwrap_or_default(),
                to: to.unwrap_or_default(),
                body: body.to_string(),
            },
        }
    }

    fn headerless(text: &str) -> Self {
        Self {
            from: String::new(),
            to: String::new(),
            body: text.to_string(),
        }
    }
}
