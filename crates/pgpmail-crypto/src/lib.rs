//! # pgpmail-crypto
//!
//! OpenPGP operations for pgpmail, built on `sequoia-openpgp`.
//!
//! Everything that touches packets, armor, or key material lives here; the
//! rest of the workspace only ever sees armored text and plaintext bytes.
//!
//! ## Examples
//!
//! ### Generate a Keypair
//!
//! ```rust
//! use pgpmail_core::{EmailAddress, UserIdentity};
//! use pgpmail_crypto::{KeyAlgorithm, KeyPair};
//!
//! let email = EmailAddress::new("alice@example.com").unwrap();
//! let keypair = KeyPair::generate(&UserIdentity::for_email(&email), KeyAlgorithm::Cv25519).unwrap();
//!
//! let armored = keypair.to_armored().unwrap();
//! assert!(armored.public_key.contains("BEGIN PGP PUBLIC KEY BLOCK"));
//! ```
//!
//! ### Encrypt and Trial-Decrypt
//!
//! ```rust
//! use pgpmail_core::{EmailAddress, UserIdentity};
//! use pgpmail_crypto::{encrypt_message, try_decrypt, DecryptAttempt, KeyAlgorithm, KeyPair};
//!
//! let bob = EmailAddress::new("bob@example.com").unwrap();
//! let keypair = KeyPair::generate(&UserIdentity::for_email(&bob), KeyAlgorithm::Cv25519).unwrap();
//!
//! let ciphertext = encrypt_message(b"Secret", &keypair.public_key()).unwrap();
//! let private = keypair.to_armored().unwrap().private_key;
//!
//! match try_decrypt(ciphertext.as_bytes(), &private) {
//!     DecryptAttempt::Decrypted(plaintext) => assert_eq!(plaintext, b"Secret"),
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```

pub mod encrypt;
pub mod error;
pub mod keys;

pub use encrypt::{encrypt_message, try_decrypt, DecryptAttempt};
pub use error::{CryptoError, CryptoResult};
pub use keys::{KeyAlgorithm, KeyPair, PublicKey};
