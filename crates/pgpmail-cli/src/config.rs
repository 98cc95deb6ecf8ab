//! Runtime configuration for the pgpmail client.
//!
//! Values are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults (`users/`, `messages/`, RSA-2048)
//! 2. An optional TOML file
//! 3. `PGPMAIL_*` environment variables
//! 4. Command-line flags
//!
//! # Example TOML
//!
//! ```toml
//! users_dir = "/var/lib/pgpmail/users"
//! messages_dir = "/var/lib/pgpmail/messages"
//! key_algorithm = "cv25519"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use pgpmail_core::defaults;
use pgpmail_crypto::KeyAlgorithm;

/// Environment variable naming the key store root.
pub const ENV_USERS_DIR: &str = "PGPMAIL_USERS_DIR";
/// Environment variable naming the message store root.
pub const ENV_MESSAGES_DIR: &str = "PGPMAIL_MESSAGES_DIR";
/// Environment variable selecting the algorithm for new keys.
pub const ENV_KEY_ALGORITHM: &str = "PGPMAIL_KEY_ALGORITHM";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for pgpmail_core::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => pgpmail_core::Error::Io(e),
            other => pgpmail_core::Error::Config(other.to_string()),
        }
    }
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub users_dir: Option<PathBuf>,
    pub messages_dir: Option<PathBuf>,
    pub key_algorithm: Option<KeyAlgorithm>,
}

/// Where keys and messages live, and how new keys are generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Root of the per-user key directories.
    pub users_dir: PathBuf,
    /// Directory holding the numbered message files.
    pub messages_dir: PathBuf,
    /// Algorithm for keys generated on first use of an address.
    pub key_algorithm: KeyAlgorithm,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            users_dir: PathBuf::from(defaults::USERS_DIR),
            messages_dir: PathBuf::from(defaults::MESSAGES_DIR),
            key_algorithm: KeyAlgorithm::default(),
        }
    }
}

impl MailConfig {
    /// Load configuration from a TOML file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: MailConfig = toml::from_str(&content)?;
        debug!(path = %path.as_ref().display(), "Loaded config file");
        Ok(config)
    }

    /// Build the full configuration: defaults, optional file, environment.
    ///
    /// Command-line flags are applied separately with [`Self::apply_overrides`].
    pub fn load(config_file: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay the `PGPMAIL_*` process environment.
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_env_from(|name| env::var(name).ok())
    }

    /// Overlay variables read through `lookup`. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(dir) = get(ENV_USERS_DIR) {
            self.users_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get(ENV_MESSAGES_DIR) {
            self.messages_dir = PathBuf::from(dir);
        }
        if let Some(value) = get(ENV_KEY_ALGORITHM) {
            self.key_algorithm = value.parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_KEY_ALGORITHM,
                value,
            })?;
        }

        Ok(())
    }

    /// Overlay command-line flags.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(dir) = &overrides.users_dir {
            self.users_dir = dir.clone();
        }
        if let Some(dir) = &overrides.messages_dir {
            self.messages_dir = dir.clone();
        }
        if let Some(algorithm) = overrides.key_algorithm {
            self.key_algorithm = algorithm;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.users_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "users_dir cannot be empty".to_string(),
            ));
        }

        if self.messages_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "messages_dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MailConfig::default();
        assert_eq!(config.users_dir, PathBuf::from("users"));
        assert_eq!(config.messages_dir, PathBuf::from("messages"));
        assert_eq!(config.key_algorithm, KeyAlgorithm::Rsa2048);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "key_algorithm = \"cv25519\"").unwrap();

        let config = MailConfig::from_file(file.path()).unwrap();
        assert_eq!(config.key_algorithm, KeyAlgorithm::Cv25519);
        assert_eq!(config.users_dir, PathBuf::from("users"));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "users_dir = [").unwrap();

        let result = MailConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = MailConfig::load(Some(Path::new("/nonexistent/pgpmail.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = MailConfig {
            users_dir: PathBuf::from("/from/file"),
            ..MailConfig::default()
        };
        config
            .apply_env_from(lookup(&[
                (ENV_USERS_DIR, "/from/env"),
                (ENV_KEY_ALGORITHM, "rsa4096"),
                (ENV_MESSAGES_DIR, "  "),
            ]))
            .unwrap();

        assert_eq!(config.users_dir, PathBuf::from("/from/env"));
        assert_eq!(config.messages_dir, PathBuf::from("messages"));
        assert_eq!(config.key_algorithm, KeyAlgorithm::Rsa4096);
    }

    #[test]
    fn test_bad_algorithm_in_env() {
        let mut config = MailConfig::default();
        let err = config
            .apply_env_from(lookup(&[(ENV_KEY_ALGORITHM, "dsa")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PGPMAIL_KEY_ALGORITHM: dsa");
    }

    #[test]
    fn test_flags_win() {
        let mut config = MailConfig::default();
        config.apply_overrides(&ConfigOverrides {
            messages_dir: Some(PathBuf::from("/tmp/inbox")),
            key_algorithm: Some(KeyAlgorithm::Cv25519),
            ..ConfigOverrides::default()
        });

        assert_eq!(config.users_dir, PathBuf::from("users"));
        assert_eq!(config.messages_dir, PathBuf::from("/tmp/inbox"));
        assert_eq!(config.key_algorithm, KeyAlgorithm::Cv25519);
    }

    #[test]
    fn test_empty_dir_rejected() {
        let config = MailConfig {
            messages_dir: PathBuf::new(),
            ..MailConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }
}
