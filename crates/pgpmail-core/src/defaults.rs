//! Centralized default constants for pgpmail.
//!
//! **This module is the single source of truth** for storage layout names
//! and console formatting. Other crates reference these constants instead
//! of repeating literals.

// =============================================================================
// STORAGE LAYOUT
// =============================================================================

/// Directory holding one sub-directory per user, relative to the working directory.
pub const USERS_DIR: &str = "users";

/// Directory holding encrypted message files, relative to the working directory.
pub const MESSAGES_DIR: &str = "messages";

/// Suffix of the armored private key file inside a user directory.
pub const PRIVATE_KEY_SUFFIX: &str = "_private.asc";

/// Suffix of the armored public key file inside a user directory.
pub const PUBLIC_KEY_SUFFIX: &str = "_public.asc";

/// File name prefix of stored messages (`message_001.asc`).
pub const MESSAGE_PREFIX: &str = "message_";

/// File extension of stored messages.
pub const MESSAGE_EXTENSION: &str = "asc";

/// Minimum number of digits in a message index; shorter indices are zero padded.
pub const MESSAGE_INDEX_WIDTH: usize = 3;

// =============================================================================
// CONSOLE
// =============================================================================

/// Width of the horizontal rules framing ciphertext and plaintext.
pub const RULE_WIDTH: usize = 60;

/// Character used to frame ciphertext after composing.
pub const CIPHERTEXT_RULE: char = '=';

/// Character used to frame plaintext after decrypting.
pub const PLAINTEXT_RULE: char = '-';

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Prefix shared by every configuration environment variable.
pub const ENV_PREFIX: &str = "PGPMAIL_";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_suffixes_are_distinct() {
        assert_ne!(PRIVATE_KEY_SUFFIX, PUBLIC_KEY_SUFFIX);
        assert!(PRIVATE_KEY_SUFFIX.ends_with(MESSAGE_EXTENSION));
        assert!(PUBLIC_KEY_SUFFIX.ends_with(MESSAGE_EXTENSION));
    }
}
