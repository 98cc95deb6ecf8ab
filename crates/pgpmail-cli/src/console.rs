//! Line-oriented terminal presentation.
//!
//! All user-visible text goes through [`Console`], which is generic over its
//! input and output so the whole menu can be driven from a script in tests.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use pgpmail_core::defaults::{CIPHERTEXT_RULE, PLAINTEXT_RULE, RULE_WIDTH};
use pgpmail_core::{Error, MessageId};

use crate::services::{ComposeOutcome, DecryptReport, KeyStatus};

fn rule(c: char) -> String {
    std::iter::repeat(c).take(RULE_WIDTH).collect()
}

pub struct Console<R, W> {
    input: R,
    output: W,
    messages_dir: Option<PathBuf>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            messages_dir: None,
        }
    }

    /// Show stored messages as paths under `dir` instead of bare file names.
    pub fn with_messages_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.messages_dir = Some(dir.into());
        self
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `label` and read one line.
    ///
    /// Returns `None` at end of input. The trailing line break is removed,
    /// other whitespace is kept.
    pub fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "📧 PGP Email System")?;
        writeln!(self.output, "1. Compose and encrypt a message")?;
        writeln!(self.output, "2. Decrypt a message")?;
        writeln!(self.output, "3. Exit")
    }

    pub fn message_listing(&mut self, listing: &[MessageId]) -> io::Result<()> {
        writeln!(self.output, "\n📂 Available messages:")?;
        for (position, id) in listing.iter().enumerate() {
            writeln!(self.output, "{}. {}", position + 1, id.file_name())?;
        }
        Ok(())
    }

    pub fn key_status(&mut self, email: &str, status: KeyStatus) -> io::Result<()> {
        match status {
            KeyStatus::Generated => writeln!(self.output, "✅ Key pair created for {}", email),
            KeyStatus::Existing => writeln!(self.output, "🔑 Existing key found for {}", email),
        }
    }

    pub fn compose_outcome(
        &mut self,
        sender: &str,
        recipient: &str,
        outcome: &ComposeOutcome,
    ) -> io::Result<()> {
        self.key_status(sender, outcome.sender_status)?;
        if sender != recipient {
            self.key_status(recipient, outcome.recipient_status)?;
        }

        let location = match &self.messages_dir {
            Some(dir) => dir.join(outcome.message_id.file_name()).display().to_string(),
            None => outcome.message_id.file_name(),
        };
        writeln!(self.output, "\n✅ Message encrypted and saved as: {}", location)?;

        let frame = rule(CIPHERTEXT_RULE);
        writeln!(self.output, "\n🔒 Encrypted message:")?;
        writeln!(self.output, "{}", frame)?;
        writeln!(self.output, "{}", outcome.armored.trim_end())?;
        writeln!(self.output, "{}", frame)?;
        writeln!(
            self.output,
            "💡 You can decrypt this message later from the main menu."
        )
    }

    pub fn decrypt_report(&mut self, report: &DecryptReport) -> io::Result<()> {
        if let Some(opened) = &report.opened {
            let frame = rule(PLAINTEXT_RULE);
            writeln!(self.output, "\n✅ Decrypted using key: {}", opened.key_label)?;
            writeln!(self.output, "{}", frame)?;
            writeln!(self.output, "{}", opened.plaintext)?;
            return writeln!(self.output, "{}", frame);
        }

        writeln!(self.output, "❌ Decryption failed with all available keys.")?;
        let summary: Vec<String> = report
            .failure_summary()
            .into_iter()
            .map(|(kind, count)| format!("{} {}", count, kind.replace('_', " ")))
            .collect();
        if !summary.is_empty() {
            writeln!(self.output, "   ({})", summary.join(", "))?;
        }
        Ok(())
    }

    pub fn error(&mut self, err: &Error) -> io::Result<()> {
        writeln!(self.output, "❌ {}", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{AttemptOutcome, KeyAttempt, OpenedMessage};
    use pgpmail_core::Envelope;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn printed(console: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn test_prompt_strips_line_break_only() {
        let mut console = console("  spaced  \r\nnext\n");
        assert_eq!(console.prompt("> ").unwrap().as_deref(), Some("  spaced  "));
        assert_eq!(console.prompt("> ").unwrap().as_deref(), Some("next"));
        assert_eq!(console.prompt("> ").unwrap(), None);
        assert_eq!(printed(console), "> > > ");
    }

    #[test]
    fn test_listing_is_one_based() {
        let mut console = console("");
        let listing = vec![MessageId::new(1).unwrap(), MessageId::new(2).unwrap()];
        console.message_listing(&listing).unwrap();

        let out = printed(console);
        assert!(out.contains("1. message_001.asc\n"));
        assert!(out.contains("2. message_002.asc\n"));
    }

    #[test]
    fn test_opened_message_is_framed() {
        let mut console = console("");
        let plaintext = "From: a@x.org\nTo: b@x.org\n\nhi".to_string();
        let report = DecryptReport {
            message_id: MessageId::FIRST,
            attempts: vec![KeyAttempt {
                key_label: "b@x.org_private.asc".into(),
                outcome: AttemptOutcome::Decrypted,
            }],
            opened: Some(OpenedMessage {
                key_label: "b@x.org_private.asc".into(),
                envelope: Envelope::parse(&plaintext),
                plaintext: plaintext.clone(),
            }),
        };
        console.decrypt_report(&report).unwrap();

        let frame = "-".repeat(60);
        let out = printed(console);
        assert!(out.contains("Decrypted using key: b@x.org_private.asc"));
        assert!(out.contains(&format!("{}\n{}\n{}\n", frame, plaintext, frame)));
    }

    #[test]
    fn test_failure_shows_summary_not_reasons() {
        let mut console = console("");
        let report = DecryptReport {
            message_id: MessageId::FIRST,
            attempts: vec![
                KeyAttempt {
                    key_label: "a".into(),
                    outcome: AttemptOutcome::WrongKey,
                },
                KeyAttempt {
                    key_label: "b".into(),
                    outcome: AttemptOutcome::Failed("secret detail".into()),
                },
            ],
            opened: None,
        };
        console.decrypt_report(&report).unwrap();

        let out = printed(console);
        assert!(out.contains("Decryption failed with all available keys."));
        assert!(out.contains("(1 failed, 1 wrong key)"));
        assert!(!out.contains("secret detail"));
    }
}
