//! Structured log output of the workflows.
//!
//! This test suite validates:
//! - Decrypt attempts are logged with the shared field names
//! - Ordinary user mistakes and unopenable messages stay below WARN, so
//!   the default `pgpmail=warn` filter keeps the console clean

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use pgpmail_cli::services::{ComposeRequest, ComposeService, DecryptService};
use pgpmail_cli::{Console, MailApp};
use pgpmail_core::{logging, MessageId, MessageRepository};
use pgpmail_crypto::KeyAlgorithm;
use pgpmail_store::{InMemoryKeyRepository, InMemoryMessageRepository};
use tracing::Level;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn capture<T>(level: Level, f: impl FnOnce() -> T) -> (T, String) {
    let sink = Captured::default();
    let writer = sink.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, sink.text())
}

type Keys = Arc<InMemoryKeyRepository>;
type Messages = Arc<InMemoryMessageRepository>;

fn stores() -> (Keys, Messages) {
    (
        Arc::new(InMemoryKeyRepository::new()),
        Arc::new(InMemoryMessageRepository::new()),
    )
}

// ============================================================================
// Test Category 1: Field Names
// ============================================================================

#[test]
fn test_decrypt_attempts_use_shared_field_names() {
    let (keys, messages) = stores();
    let compose = ComposeService::new(keys.clone(), messages.clone(), KeyAlgorithm::Cv25519);
    // alice's key sorts first and is the wrong one
    let outcome = compose
        .compose(ComposeRequest::new("alice@example.com", "bob@example.com", "hi").unwrap())
        .unwrap();

    let decrypt = DecryptService::new(keys, messages);
    let (report, logs) = capture(Level::DEBUG, || decrypt.decrypt(outcome.message_id).unwrap());

    assert!(report.is_opened());
    assert!(logs.contains(&format!("{}=", logging::ATTEMPT_OUTCOME)), "{logs}");
    assert!(logs.contains("wrong_key"), "{logs}");
    assert!(logs.contains("decrypted"), "{logs}");
    assert!(logs.contains(&format!("{}=", logging::KEY_LABEL)), "{logs}");
    assert!(logs.contains(&format!("{}=message_001.asc", logging::MESSAGE_ID)), "{logs}");
    assert!(logs.contains(&format!("{}=", logging::ATTEMPT_COUNT)), "{logs}");
}

// ============================================================================
// Test Category 2: Default Level Stays Quiet
// ============================================================================

#[test]
fn test_user_mistakes_and_failed_decrypts_log_nothing_at_warn() {
    let (keys, messages) = stores();
    messages
        .put(MessageId::new(2).unwrap(), "not an openpgp message")
        .unwrap();

    let script = concat!(
        "9\n",                                             // invalid menu choice
        "1\n\nbob@example.com\nhi\n",                      // empty sender
        "1\nalice@example.com\nbob@example.com\nhi\n",     // stored as message 1
        "2\n7\n",                                          // out of range
        "2\n2\n",                                          // no key opens it
        "3\n",
    );
    let mut app = MailApp::new(
        ComposeService::new(keys.clone(), messages.clone(), KeyAlgorithm::Cv25519),
        DecryptService::new(keys, messages),
        Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new()),
    );

    let ((), logs) = capture(Level::WARN, || app.run().unwrap());
    let out = String::from_utf8(app.into_console().into_output()).unwrap();

    assert!(out.contains("Invalid choice"));
    assert!(out.contains("Invalid selection '7'"));
    assert!(out.contains("Decryption failed with all available keys."));
    assert_eq!(logs, "");
}
