//! # pgpmail-cli
//!
//! Interactive OpenPGP mail client. Users compose a message between two
//! addresses; key pairs are created on first use, the message is encrypted
//! to the recipient and stored as a numbered armored file. Stored messages
//! can later be decrypted by trying every private key on record.
//!
//! ## Modules
//!
//! - [`config`]: layered configuration (defaults, TOML, env, flags)
//! - [`services`]: key management, compose and decrypt workflows
//! - [`console`]: terminal rendering and prompts
//! - [`menu`]: the main menu loop

pub mod config;
pub mod console;
pub mod menu;
pub mod services;

pub use config::{ConfigError, ConfigOverrides, ConfigResult, MailConfig};
pub use console::Console;
pub use menu::{MailApp, MenuChoice};
