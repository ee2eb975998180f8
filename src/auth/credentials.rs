//! Credential storage
//!
//! A credential source answers one question: is this `user:password` pair
//! known? The file-backed source re-reads its file on every call, so edits
//! take effect for the next login without a restart.

use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::validator::is_valid_pair;

/// Anything that can grant or deny a login.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Credentials kept in a text file, one `username:password` record per line.
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialVerifier for CredentialFile {
    fn verify(&self, username: &str, password: &str) -> bool {
        if !is_valid_pair(username, password) {
            debug!("Rejected malformed credentials for {:?}", username);
            return false;
        }

        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Error opening {}: {}", self.path.display(), e);
                return false;
            }
        };

        let wanted = format!("{username}:{password}");
        contents
            .lines()
            .any(|line| line.trim_end_matches('\r') == wanted)
    }
}

/// In-memory credential store.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.users.insert(username.to_string(), password.to_string());
        self
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        is_valid_pair(username, password)
            && self
                .users
                .get(username)
                .is_some_and(|stored| stored == password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn users_file(contents: &str) -> (tempfile::TempDir, CredentialFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ftpusers");
        fs::write(&path, contents).unwrap();
        (dir, CredentialFile::new(path))
    }

    #[test]
    fn grants_exact_records_only() {
        let (_dir, store) = users_file("alice:secret\nbob:hunter2\r\n");
        assert!(store.verify("alice", "secret"));
        assert!(store.verify("bob", "hunter2"));
        assert!(!store.verify("alice", "hunter2"));
        assert!(!store.verify("alic", "secret"));
        assert!(!store.verify("alice", "secre"));
        assert!(!store.verify("carol", "secret"));
    }

    #[test]
    fn reloads_on_every_call() {
        let (_dir, store) = users_file("alice:secret\n");
        assert!(!store.verify("carol", "pw"));
        fs::write(store.path(), "alice:secret\ncarol:pw\n").unwrap();
        assert!(store.verify("carol", "pw"));
    }

    #[test]
    fn missing_file_denies() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialFile::new(dir.path().join("absent"));
        assert!(!store.verify("alice", "secret"));
    }

    #[test]
    fn separator_in_username_cannot_forge_a_record() {
        let (_dir, store) = users_file("alice:secret\n");
        assert!(!store.verify("alice:secret", ""));
        assert!(!store.verify("alice:", "secret"));
    }

    #[test]
    fn static_store_matches_pairs() {
        let store = StaticCredentials::new().with_user("alice", "secret");
        assert!(store.verify("alice", "secret"));
        assert!(!store.verify("alice", "wrong"));
        assert!(!store.verify("bob", "secret"));
    }
}
