//! Error types for pgpmail.

use thiserror::Error;

/// Result type alias using pgpmail's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pgpmail operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// OpenPGP operation failed (key generation, parsing, encryption)
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Storage layer failed in a way that is not a plain I/O error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The message store holds no messages
    #[error("No encrypted messages found")]
    NoMessages,

    /// The key store holds no private keys
    #[error("No private keys available, generate one first")]
    NoPrivateKeys,

    /// A message selection was not a number in `1..=count`
    #[error("Invalid selection '{input}': expected a number between 1 and {count}")]
    InvalidSelection { input: String, count: usize },

    /// Every available private key was tried and none opened the message
    #[error("Decryption failed with all {attempts} available keys")]
    DecryptionFailed { attempts: usize },

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error was caused by what the user typed or by an empty
    /// store, rather than by the system.
    ///
    /// The menu loop prints these without a cause chain.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_)
                | Error::NoMessages
                | Error::NoPrivateKeys
                | Error::InvalidSelection { .. }
                | Error::DecryptionFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("message_007.asc".to_string());
        assert_eq!(err.to_string(), "Not found: message_007.asc");
    }

    #[test]
    fn test_error_display_crypto() {
        let err = Error::Crypto("bad armor".to_string());
        assert_eq!(err.to_string(), "Crypto error: bad armor");
    }

    #[test]
    fn test_error_display_invalid_selection() {
        let err = Error::InvalidSelection {
            input: "9".to_string(),
            count: 2,
        };
        assert_eq!(
            err.to_string(),
            "Invalid selection '9': expected a number between 1 and 2"
        );
    }

    #[test]
    fn test_error_display_decryption_failed() {
        let err = Error::DecryptionFailed { attempts: 3 };
        assert!(err.to_string().contains("3"));
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(Error::NoMessages.is_user_facing());
        assert!(Error::NoPrivateKeys.is_user_facing());
        assert!(Error::InvalidInput("empty".into()).is_user_facing());
        assert!(!Error::Crypto("boom".into()).is_user_facing());
        assert!(!Error::Storage("disk".into()).is_user_facing());
    }
}
