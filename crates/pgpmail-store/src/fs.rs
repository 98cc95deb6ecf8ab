//! Filesystem-backed key and message stores.
//!
//! ## Layout
//!
//! ```text
//! users/
//!   alice@example.com/
//!     alice@example.com_private.asc
//!     alice@example.com_public.asc
//! messages/
//!   message_001.asc
//!   message_002.asc
//! ```
//!
//! Key files are written through a temp file and a rename, so a reader never
//! sees half a key. Messages are created with create-new semantics and are
//! never overwritten.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use pgpmail_core::defaults::{PRIVATE_KEY_SUFFIX, PUBLIC_KEY_SUFFIX};
use pgpmail_core::{
    ArmoredKeyPair, EmailAddress, Error, KeyRepository, MessageId, MessageRepository,
    PrivateKeyEntry, Result,
};
use tracing::{debug, info, trace, warn};

/// Create a storage root (and its parents) if it does not exist yet.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        warn!(subsystem = "store", op = "ensure_dir", path = %path.display(), error = %e, "create_dir_all failed");
        e
    })?;
    Ok(())
}

/// Read a file, mapping "not found" to `None`.
fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write `contents` to `path` atomically: temp file + rename.
fn write_atomic(path: &Path, contents: &str, private: bool) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&temp_path).map_err(|e| {
        warn!(subsystem = "store", op = "write", path = %temp_path.display(), error = %e, "File::create failed");
        e
    })?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    drop(file);

    // Private keys are unprotected, keep them owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if private {
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    fs::rename(&temp_path, path).map_err(|e| {
        warn!(subsystem = "store", op = "write", path = %path.display(), error = %e, "rename failed");
        e
    })?;

    Ok(())
}

// =============================================================================
// KEYS
// =============================================================================

/// Key store keeping one directory per user under `root`.
#[derive(Debug, Clone)]
pub struct FsKeyRepository {
    root: PathBuf,
}

impl FsKeyRepository {
    /// Create a key store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of one user.
    pub fn user_dir(&self, email: &EmailAddress) -> PathBuf {
        self.root.join(email.as_str())
    }

    /// Paths of the private and public key files of one user.
    pub fn key_paths(&self, email: &EmailAddress) -> (PathBuf, PathBuf) {
        let dir = self.user_dir(email);
        (
            dir.join(format!("{}{}", email, PRIVATE_KEY_SUFFIX)),
            dir.join(format!("{}{}", email, PUBLIC_KEY_SUFFIX)),
        )
    }

    /// Sorted entries of a directory; a missing directory has none.
    fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = entries.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.file_name());
        Ok(entries)
    }
}

impl KeyRepository for FsKeyRepository {
    fn get(&self, email: &EmailAddress) -> Result<Option<ArmoredKeyPair>> {
        let (private_path, public_path) = self.key_paths(email);

        let Some(private_key) = read_optional(&private_path)? else {
            return Ok(None);
        };
        let Some(public_key) = read_optional(&public_path)? else {
            return Ok(None);
        };

        Ok(Some(ArmoredKeyPair {
            private_key,
            public_key,
        }))
    }

    fn put(&self, email: &EmailAddress, keys: &ArmoredKeyPair) -> Result<()> {
        let dir = self.user_dir(email);
        ensure_dir(&dir)?;

        let (private_path, public_path) = self.key_paths(email);
        write_atomic(&private_path, &keys.private_key, true)?;
        write_atomic(&public_path, &keys.public_key, false)?;

        info!(
            subsystem = "store",
            component = "fs_keys",
            op = "put",
            %email,
            path = %dir.display(),
            "Key pair stored"
        );
        Ok(())
    }

    fn exists(&self, email: &EmailAddress) -> Result<bool> {
        let (private_path, public_path) = self.key_paths(email);
        Ok(private_path.try_exists()? && public_path.try_exists()?)
    }

    fn list(&self) -> Result<Vec<EmailAddress>> {
        let mut emails = Vec::new();
        for entry in Self::sorted_entries(&self.root)? {
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            match name.to_str().map(EmailAddress::new) {
                Some(Ok(email)) => emails.push(email),
                _ => warn!(path = %entry.path().display(), "Skipping unusable user directory"),
            }
        }
        Ok(emails)
    }

    fn list_private_keys(&self) -> Result<Vec<PrivateKeyEntry>> {
        let mut keys = Vec::new();

        for user in Self::sorted_entries(&self.root)? {
            if !user.file_type()?.is_dir() {
                continue;
            }

            for file in Self::sorted_entries(&user.path())? {
                let name = file.file_name();
                let Some(label) = name.to_str() else {
                    continue;
                };
                if !label.ends_with(PRIVATE_KEY_SUFFIX) || !file.file_type()?.is_file() {
                    continue;
                }

                trace!(key_label = %label, "Found private key");
                match fs::read_to_string(file.path()) {
                    Ok(armored) => keys.push(PrivateKeyEntry {
                        label: label.to_string(),
                        armored,
                    }),
                    // An unreadable key must not hide the others
                    Err(e) => {
                        warn!(path = %file.path().display(), error = %e, "Unreadable private key skipped")
                    }
                }
            }
        }

        debug!(component = "fs_keys", op = "list_private_keys", result_count = keys.len(), "Private keys listed");
        Ok(keys)
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

/// Message store keeping numbered files directly under `root`.
#[derive(Debug, Clone)]
pub struct FsMessageRepository {
    root: PathBuf,
}

impl FsMessageRepository {
    /// Create a message store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a message file.
    pub fn path_of(&self, id: MessageId) -> PathBuf {
        self.root.join(id.file_name())
    }
}

impl MessageRepository for FsMessageRepository {
    fn next_id(&self) -> Result<MessageId> {
        let mut id = MessageId::FIRST;
        while self.path_of(id).try_exists()? {
            id = id.next();
        }
        debug!(component = "fs_messages", op = "next_id", message_id = %id, "Next message id");
        Ok(id)
    }

    fn put(&self, id: MessageId, armored: &str) -> Result<()> {
        ensure_dir(&self.root)?;
        let path = self.path_of(id);

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    Error::Storage(format!("{} already exists", id))
                } else {
                    e.into()
                }
            })?;
        file.write_all(armored.as_bytes())?;
        file.sync_all()?;

        info!(
            subsystem = "store",
            component = "fs_messages",
            op = "put",
            message_id = %id,
            path = %path.display(),
            size_bytes = armored.len(),
            "Message stored"
        );
        Ok(())
    }

    fn get(&self, id: MessageId) -> Result<Option<String>> {
        read_optional(&self.path_of(id))
    }

    fn list(&self) -> Result<Vec<MessageId>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            match name.parse::<MessageId>() {
                Ok(id) if entry.file_type()?.is_file() => ids.push(id),
                _ => trace!(path = %entry.path().display(), "Ignoring non-message file"),
            }
        }

        ids.sort();
        debug!(component = "fs_messages", op = "list", result_count = ids.len(), "Messages listed");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(s: &str) -> EmailAddress {
        EmailAddress::new(s).unwrap()
    }

    fn pair(tag: &str) -> ArmoredKeyPair {
        ArmoredKeyPair {
            private_key: format!("private-{}", tag),
            public_key: format!("public-{}", tag),
        }
    }

    #[test]
    fn test_key_paths_follow_layout() {
        let repo = FsKeyRepository::new("users");
        let (private, public) = repo.key_paths(&email("a@x.org"));
        assert_eq!(private, Path::new("users/a@x.org/a@x.org_private.asc"));
        assert_eq!(public, Path::new("users/a@x.org/a@x.org_public.asc"));
    }

    #[test]
    fn test_put_then_get() {
        let temp = tempfile::tempdir().unwrap();
        let repo = FsKeyRepository::new(temp.path().join("users"));
        let alice = email("alice@example.com");

        assert!(!repo.exists(&alice).unwrap());
        assert!(repo.get(&alice).unwrap().is_none());

        repo.put(&alice, &pair("a")).unwrap();

        assert!(repo.exists(&alice).unwrap());
        assert_eq!(repo.get(&alice).unwrap(), Some(pair("a")));
        assert!(!repo.user_dir(&alice).join("alice@example.com_private.tmp").exists());
    }

    #[test]
    fn test_exists_requires_both_halves() {
        let temp = tempfile::tempdir().unwrap();
        let repo = FsKeyRepository::new(temp.path());
        let bob = email("bob@example.com");

        repo.put(&bob, &pair("b")).unwrap();
        let (_, public) = repo.key_paths(&bob);
        fs::remove_file(public).unwrap();

        assert!(!repo.exists(&bob).unwrap());
        assert!(repo.get(&bob).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_private_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let repo = FsKeyRepository::new(temp.path());
        let carol = email("carol@example.com");
        repo.put(&carol, &pair("c")).unwrap();

        let (private, _) = repo.key_paths(&carol);
        let mode = fs::metadata(private).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_message_put_refuses_overwrite() {
        let temp = tempfile::tempdir().unwrap();
        let repo = FsMessageRepository::new(temp.path().join("messages"));

        repo.put(MessageId::FIRST, "one").unwrap();
        let err = repo.put(MessageId::FIRST, "two").unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(repo.get(MessageId::FIRST).unwrap().as_deref(), Some("one"));
    }

    #[test]
    fn test_missing_roots_list_empty() {
        let temp = tempfile::tempdir().unwrap();
        let keys = FsKeyRepository::new(temp.path().join("nope"));
        let messages = FsMessageRepository::new(temp.path().join("nada"));

        assert!(keys.list().unwrap().is_empty());
        assert!(keys.list_private_keys().unwrap().is_empty());
        assert!(messages.list().unwrap().is_empty());
        assert_eq!(messages.next_id().unwrap(), MessageId::FIRST);
    }
}
