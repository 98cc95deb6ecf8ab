//! The interactive main menu.

use std::io::{self, BufRead, Write};

use pgpmail_core::{Error, KeyRepository, MessageRepository};
use tracing::{debug, error};

use crate::console::Console;
use crate::services::{parse_selection, ComposeRequest, ComposeService, DecryptService};

/// A parsed main-menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Compose,
    Decrypt,
    Exit,
    Invalid,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "1" => Self::Compose,
            "2" => Self::Decrypt,
            "3" => Self::Exit,
            _ => Self::Invalid,
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

/// The menu loop over a pair of services and a console.
pub struct MailApp<K, M, R, W> {
    compose: ComposeService<K, M>,
    decrypt: DecryptService<K, M>,
    console: Console<R, W>,
}

impl<K, M, R, W> MailApp<K, M, R, W>
where
    K: KeyRepository,
    M: MessageRepository,
    R: BufRead,
    W: Write,
{
    pub fn new(
        compose: ComposeService<K, M>,
        decrypt: DecryptService<K, M>,
        console: Console<R, W>,
    ) -> Self {
        Self {
            compose,
            decrypt,
            console,
        }
    }

    pub fn into_console(self) -> Console<R, W> {
        self.console
    }

    /// Run until the user exits or input ends.
    ///
    /// Only console I/O errors end the loop early; a failed workflow is
    /// reported and the menu is shown again.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.console.banner()?;
            let Some(input) = self.console.prompt("\nSelect an option (1-3): ")? else {
                break;
            };

            let flow = match MenuChoice::parse(&input) {
                MenuChoice::Compose => self.compose_flow()?,
                MenuChoice::Decrypt => self.decrypt_flow()?,
                MenuChoice::Exit => Flow::Quit,
                MenuChoice::Invalid => {
                    self.console.line("❌ Invalid choice. Try again.")?;
                    Flow::Continue
                }
            };

            if let Flow::Quit = flow {
                break;
            }
        }

        self.console.line("\n👋 Exiting. Stay secure!")
    }

    fn compose_flow(&mut self) -> io::Result<Flow> {
        let Some(sender) = self.console.prompt("\nEnter sender's email: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(recipient) = self.console.prompt("Enter recipient's email: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(body) = self.console.prompt("\n✉️  Enter the message: ")? else {
            return Ok(Flow::Quit);
        };

        let request = match ComposeRequest::new(&sender, &recipient, body) {
            Ok(request) => request,
            Err(err) => {
                self.report(&err)?;
                return Ok(Flow::Continue);
            }
        };

        let sender = request.sender.to_string();
        let recipient = request.recipient.to_string();
        match self.compose.compose(request) {
            Ok(outcome) => self
                .console
                .compose_outcome(&sender, &recipient, &outcome)?,
            Err(err) => self.report(&err)?,
        }

        Ok(Flow::Continue)
    }

    fn decrypt_flow(&mut self) -> io::Result<Flow> {
        let listing = match self.decrypt.list_messages() {
            Ok(listing) if listing.is_empty() => {
                self.report(&Error::NoMessages)?;
                return Ok(Flow::Continue);
            }
            Ok(listing) => listing,
            Err(err) => {
                self.report(&err)?;
                return Ok(Flow::Continue);
            }
        };

        self.console.message_listing(&listing)?;
        let Some(input) = self
            .console
            .prompt("\nSelect a message to decrypt (number): ")?
        else {
            return Ok(Flow::Quit);
        };

        let result = parse_selection(&input, &listing).and_then(|id| self.decrypt.decrypt(id));
        match result {
            Ok(report) => self.console.decrypt_report(&report)?,
            Err(err) => self.report(&err)?,
        }

        Ok(Flow::Continue)
    }

    fn report(&mut self, err: &Error) -> io::Result<()> {
        if err.is_user_facing() {
            debug!(subsystem = "cli", component = "menu", error = %err, "Workflow rejected");
        } else {
            error!(subsystem = "cli", component = "menu", error = %err, "Workflow failed");
        }
        self.console.error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgpmail_crypto::KeyAlgorithm;
    use pgpmail_store::{InMemoryKeyRepository, InMemoryMessageRepository};
    use std::io::Cursor;
    use std::sync::Arc;

    type App = MailApp<
        Arc<InMemoryKeyRepository>,
        Arc<InMemoryMessageRepository>,
        Cursor<Vec<u8>>,
        Vec<u8>,
    >;

    fn app(script: &str) -> App {
        let keys = Arc::new(InMemoryKeyRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        MailApp::new(
            ComposeService::new(keys.clone(), messages.clone(), KeyAlgorithm::Cv25519),
            DecryptService::new(keys, messages),
            Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new()),
        )
    }

    fn run(script: &str) -> String {
        let mut app = app(script);
        app.run().unwrap();
        String::from_utf8(app.into_console().into_output()).unwrap()
    }

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("1"), MenuChoice::Compose);
        assert_eq!(MenuChoice::parse(" 2 \n"), MenuChoice::Decrypt);
        assert_eq!(MenuChoice::parse("3"), MenuChoice::Exit);
        assert_eq!(MenuChoice::parse("4"), MenuChoice::Invalid);
        assert_eq!(MenuChoice::parse(""), MenuChoice::Invalid);
    }

    #[test]
    fn test_invalid_choice_then_exit() {
        let out = run("9\n3\n");
        assert!(out.contains("Invalid choice"));
        assert!(out.ends_with("Stay secure!\n"));
        assert_eq!(out.matches("PGP Email System").count(), 2);
    }

    #[test]
    fn test_end_of_input_exits() {
        let out = run("");
        assert!(out.contains("Stay secure!"));
    }

    #[test]
    fn test_decrypt_with_empty_store() {
        let out = run("2\n3\n");
        assert!(out.contains("No encrypted messages found"));
    }

    #[test]
    fn test_bad_address_returns_to_menu() {
        let out = run("1\n\nbob@example.com\nhello\n3\n");
        assert!(out.contains("❌ Invalid input"));
        assert!(out.contains("Stay secure!"));
    }

    #[test]
    fn test_compose_then_decrypt() {
        let out = run("1\nalice@example.com\nbob@example.com\nHello Bob\n2\n1\n3\n");
        assert!(out.contains("✅ Key pair created for alice@example.com"));
        assert!(out.contains("✅ Key pair created for bob@example.com"));
        assert!(out.contains("saved as: message_001.asc"));
        assert!(out.contains("1. message_001.asc"));
        assert!(out.contains("Decrypted using key: bob@example.com_private.asc"));
        assert!(out.contains("From: alice@example.com\nTo: bob@example.com\n\nHello Bob\n"));
    }
}
