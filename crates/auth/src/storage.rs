//! On-disk persistence for session credentials.
//!
//! A single JSON object `{access_token, refresh_token, token_expires}` at a
//! configured path. An absent file or undecodable content is treated as "no
//! session", never as an error.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{error::AuthError, types::Credentials};

pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved credentials. Returns `None` when the file is missing,
    /// unparseable, or any token field is empty.
    pub fn load(&self) -> Option<Credentials> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no saved session");
                return None;
            }
        };
        let creds: Credentials = match serde_json::from_str(&raw) {
            Ok(creds) => creds,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "token file undecodable, ignoring");
                return None;
            }
        };
        if creds.access_token.is_empty() || creds.refresh_token.is_empty() {
            return None;
        }
        Some(creds)
    }

    /// Persist credentials, creating parent directories as needed.
    pub fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string(credentials)?)?;
        debug!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    /// Remove the token file. Missing file is fine.
    pub fn delete(&self) -> Result<(), AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn is_session_saved(&self) -> bool {
        self.load().is_some()
    }
}
