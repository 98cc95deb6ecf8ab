//! Service layer for the mail workflows.
//!
//! Services take already-validated inputs and return structured results.
//! They never read from or write to the console.

pub mod compose;
pub mod decrypt;
pub mod key_manager;

pub use compose::{ComposeOutcome, ComposeRequest, ComposeService};
pub use decrypt::{
    parse_selection, AttemptOutcome, DecryptReport, DecryptService, KeyAttempt, OpenedMessage,
};
pub use key_manager::{EnsuredKeys, KeyManager, KeyStatus};
