//! # pgpmail-store
//!
//! Storage layer for pgpmail.
//!
//! This crate provides:
//! - [`FsKeyRepository`]: per-user directories of armored key files
//! - [`FsMessageRepository`]: a flat directory of numbered message files
//! - In-memory implementations of both with identical semantics
//!
//! ## Example
//!
//! ```rust
//! use pgpmail_core::{MessageId, MessageRepository};
//! use pgpmail_store::FsMessageRepository;
//!
//! let temp = tempfile::tempdir().unwrap();
//! let messages = FsMessageRepository::new(temp.path().join("messages"));
//!
//! let id = messages.next_id().unwrap();
//! assert_eq!(id, MessageId::FIRST);
//!
//! messages.put(id, "-----BEGIN PGP MESSAGE-----").unwrap();
//! assert_eq!(messages.next_id().unwrap().file_name(), "message_002.asc");
//! ```

pub mod fs;
pub mod memory;

pub use fs::{ensure_dir, FsKeyRepository, FsMessageRepository};
pub use memory::{InMemoryKeyRepository, InMemoryMessageRepository};
