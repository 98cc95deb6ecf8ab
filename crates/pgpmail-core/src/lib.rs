//! # pgpmail-core
//!
//! Core types, storage traits, and errors for pgpmail.
//!
//! This crate is the leaf of the workspace. It knows nothing about OpenPGP
//! or the filesystem; it defines what a user, a key pair, and a stored
//! message are, and the [`KeyRepository`] / [`MessageRepository`] seams the
//! rest of the system is written against.
//!
//! ## Example
//!
//! ```rust
//! use pgpmail_core::{EmailAddress, Envelope, MessageId};
//!
//! let alice = EmailAddress::new("alice@example.com").unwrap();
//! let bob = EmailAddress::new("bob@example.com").unwrap();
//!
//! let envelope = Envelope::new(&alice, &bob, "See you at noon");
//! assert!(envelope.render().starts_with("From: alice@example.com\nTo: bob@example.com\n\n"));
//!
//! assert_eq!(MessageId::FIRST.file_name(), "message_001.asc");
//! ```

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

pub use error::{Error, Result};
pub use models::{ArmoredKeyPair, EmailAddress, Envelope, MessageId, PrivateKeyEntry, UserIdentity};
pub use traits::{KeyRepository, MessageRepository};
