//! Structured logging field names shared by every pgpmail crate.
//!
//! `tracing` macros take field names as identifiers, so call sites spell the
//! names out; these constants are the reference they must agree with.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | An operation failed for a reason the user cannot fix by retyping |
//! | WARN  | Storage problem worked around (unreadable key skipped, failed write) |
//! | INFO  | Keys created, messages stored or decrypted, startup |
//! | DEBUG | Per-key decrypt attempts, rejected user input, config choices |
//! | TRACE | Per-file directory scanning |
//!
//! The binary filters at `pgpmail=warn` by default, so nothing below WARN
//! reaches the interactive console unless `RUST_LOG` asks for it.

// ─── Identity fields ───────────────────────────────────────────────────────

/// Crate originating the log event.
/// Values: "crypto", "store", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "key_manager", "compose", "decrypt", "fs_keys", "fs_messages"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "ensure_keys", "compose", "decrypt", "list", "put"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Email address a key pair belongs to.
pub const EMAIL: &str = "email";

/// Sender address of a composed message.
pub const SENDER: &str = "sender";

/// Recipient address of a composed message.
pub const RECIPIENT: &str = "recipient";

/// Message file name, e.g. `message_001.asc`.
pub const MESSAGE_ID: &str = "message_id";

/// Private key label, e.g. `bob@example.com_private.asc`.
pub const KEY_LABEL: &str = "key_label";

/// Hex fingerprint of a primary key.
pub const FINGERPRINT: &str = "fingerprint";

/// Algorithm used for key generation.
pub const KEY_ALGORITHM: &str = "key_algorithm";

/// Filesystem path touched by the store.
pub const PATH: &str = "path";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Number of entries returned by a listing.
pub const RESULT_COUNT: &str = "result_count";

/// Number of private keys tried against one message.
pub const ATTEMPT_COUNT: &str = "attempt_count";

/// Byte length of a plaintext or ciphertext.
pub const SIZE_BYTES: &str = "size_bytes";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Kind of a single decrypt attempt.
/// Values: "decrypted", "wrong_key", "malformed_input", "failed"
pub const ATTEMPT_OUTCOME: &str = "attempt_outcome";

/// Detail of a failed attempt.
pub const REASON: &str = "reason";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
