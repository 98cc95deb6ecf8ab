//! pgpmail: interactive OpenPGP mail client.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pgpmail_cli::services::{ComposeService, DecryptService};
use pgpmail_cli::{Console, ConfigOverrides, MailApp, MailConfig};
use pgpmail_crypto::KeyAlgorithm;
use pgpmail_store::{ensure_dir, FsKeyRepository, FsMessageRepository};

#[derive(Parser)]
#[command(name = "pgpmail")]
#[command(author, version, about = "Compose, encrypt and decrypt OpenPGP mail")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "PGPMAIL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding one key directory per user
    #[arg(long)]
    users_dir: Option<PathBuf>,

    /// Directory holding the encrypted messages
    #[arg(long)]
    messages_dir: Option<PathBuf>,

    /// Algorithm for newly generated keys (rsa2048, rsa3072, rsa4096, cv25519)
    #[arg(long)]
    key_algorithm: Option<KeyAlgorithm>,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = MailConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.apply_overrides(&ConfigOverrides {
        users_dir: cli.users_dir,
        messages_dir: cli.messages_dir,
        key_algorithm: cli.key_algorithm,
    });
    config.validate()?;

    ensure_dir(&config.users_dir)
        .with_context(|| format!("creating {}", config.users_dir.display()))?;
    ensure_dir(&config.messages_dir)
        .with_context(|| format!("creating {}", config.messages_dir.display()))?;

    info!(
        users_dir = %config.users_dir.display(),
        messages_dir = %config.messages_dir.display(),
        key_algorithm = %config.key_algorithm,
        "Starting pgpmail"
    );

    let keys = Arc::new(FsKeyRepository::new(&config.users_dir));
    let messages = Arc::new(FsMessageRepository::new(&config.messages_dir));

    let stdin = std::io::stdin();
    let console = Console::new(stdin.lock(), std::io::stdout())
        .with_messages_dir(&config.messages_dir);

    let mut app = MailApp::new(
        ComposeService::new(keys.clone(), messages.clone(), config.key_algorithm),
        DecryptService::new(keys, messages),
        console,
    );
    app.run().context("terminal I/O failed")?;

    Ok(())
}

/// Logging options read from the environment.
///
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional)
///   LOG_ANSI    - "true"/"false" override ANSI colors
///   RUST_LOG    - standard env filter (default: "pgpmail=warn")
#[derive(Debug, Default, PartialEq, Eq)]
struct LogSettings {
    json: bool,
    file: Option<PathBuf>,
    ansi: Option<bool>,
}

impl LogSettings {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            json: lookup("LOG_FORMAT").is_some_and(|v| v == "json"),
            file: lookup("LOG_FILE").filter(|v| !v.is_empty()).map(PathBuf::from),
            ansi: lookup("LOG_ANSI").map(|v| v == "true" || v == "1"),
        }
    }
}

/// Initialise tracing on stderr, or on a daily-rolling file when `LOG_FILE`
/// is set. Files get no ANSI colors unless `LOG_ANSI` asks for them.
fn init_tracing() -> Option<WorkerGuard> {
    let settings = LogSettings::from_lookup(|name| std::env::var(name).ok());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pgpmail=warn".into());

    let (writer, guard, default_ansi) = match &settings.file {
        Some(path) => {
            let dir = path.parent().unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("pgpmail.log");
            let appender = tracing_appender::rolling::daily(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), None, true),
    };

    let (json, text) = if settings.json {
        (Some(fmt::layer().json().with_writer(writer)), None)
    } else {
        let ansi = settings.ansi.unwrap_or(default_ansi);
        (None, Some(fmt::layer().with_ansi(ansi).with_writer(writer)))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(text)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(vars: &[(&str, &str)]) -> LogSettings {
        LogSettings::from_lookup(|name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn test_log_settings_default_to_text_on_stderr() {
        assert_eq!(settings(&[]), LogSettings::default());
    }

    #[test]
    fn test_log_settings_from_env() {
        let s = settings(&[
            ("LOG_FORMAT", "json"),
            ("LOG_FILE", "/var/log/pgpmail/client.log"),
            ("LOG_ANSI", "1"),
        ]);
        assert!(s.json);
        assert_eq!(s.file, Some(PathBuf::from("/var/log/pgpmail/client.log")));
        assert_eq!(s.ansi, Some(true));
    }

    #[test]
    fn test_log_settings_unknown_format_is_text() {
        let s = settings(&[("LOG_FORMAT", "yaml"), ("LOG_FILE", ""), ("LOG_ANSI", "no")]);
        assert!(!s.json);
        assert_eq!(s.file, None);
        assert_eq!(s.ansi, Some(false));
    }
}
